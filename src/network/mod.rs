//! Network Layer
//!
//! Wire messages and the session that feeds them into a game. The
//! transport itself belongs to the host; the session only sees decoded
//! messages and an outbound order sink.

pub mod protocol;
pub mod session;

pub use protocol::{GameInfo, InboundMessage, OrderKind, OrderRequest, OutboundMessage, ServerOrder};
pub use session::{ChannelSink, LoopbackSink, OrderSink, Session, SessionError, SessionInput, SessionState};
