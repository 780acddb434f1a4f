//! Protocol Messages
//!
//! The wire messages exchanged with the network collaborator, as JSON.
//! Each message is an event name plus a payload:
//!
//! ```json
//! {"event": "ISSUE_ORDER", "payload": {"ids": ["a"], "type": "MOVE", "target": [10, 20]}}
//! ```

use serde::{Serialize, Deserialize};

use crate::core::vec2::{Position, RawVector};
use crate::game::entity::{BareEntity, Team};

// =============================================================================
// PAYLOADS
// =============================================================================

/// Order verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    /// Drive to the target
    Move,
    /// Fire at the target
    Attack,
}

/// World snapshot carried by `GAME_INFO`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Session id
    pub id: String,
    /// Every entity in the world
    pub entities: Vec<BareEntity>,
}

/// `GAME_INFO` payload: the initial world and the local player's team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    /// Initial world
    pub game: GameSnapshot,
    /// Local player's team
    pub team: Team,
}

/// Authoritative order from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerOrder {
    /// Units the order applies to
    pub ids: Vec<String>,
    /// Verb
    #[serde(rename = "type")]
    pub kind: OrderKind,
    /// World-space target
    pub target: RawVector,
}

impl ServerOrder {
    /// Create an order.
    pub fn new(ids: Vec<String>, kind: OrderKind, target: Position) -> Self {
        Self { ids, kind, target: target.raw() }
    }

    /// Target as a world position.
    pub fn target_position(&self) -> Position {
        Position::from_raw(self.target)
    }
}

/// Order issued by the local player, tagged with the session id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Session id
    #[serde(rename = "gameId")]
    pub game_id: String,
    /// Units the order applies to
    pub ids: Vec<String>,
    /// Verb
    #[serde(rename = "type")]
    pub kind: OrderKind,
    /// World-space target
    pub target: RawVector,
}

impl OrderRequest {
    /// Tag an order with the session id.
    pub fn new(game_id: impl Into<String>, order: ServerOrder) -> Self {
        Self { game_id: game_id.into(), ids: order.ids, kind: order.kind, target: order.target }
    }

    /// Strip the session id, giving the shape the server echoes back.
    pub fn into_order(self) -> ServerOrder {
        ServerOrder { ids: self.ids, kind: self.kind, target: self.target }
    }
}

// =============================================================================
// ENVELOPES
// =============================================================================

/// Events consumed from the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum InboundMessage {
    /// Initial world snapshot
    #[serde(rename = "GAME_INFO")]
    GameInfo(GameInfo),

    /// Authoritative order
    #[serde(rename = "ISSUE_ORDER")]
    IssueOrder(ServerOrder),
}

/// Events produced for the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum OutboundMessage {
    /// Local order request
    #[serde(rename = "ISSUE_ORDER")]
    IssueOrder(OrderRequest),
}

/// Protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// JSON encode or decode failure.
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

impl InboundMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(s)?)
    }
}

impl OutboundMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(s)?)
    }
}
