//! Game Session
//!
//! Connects one [`Game`] to the outside world:
//!
//! - `GAME_INFO` builds the world (once)
//! - `ISSUE_ORDER` applies authoritative orders between frames
//! - local input is applied synchronously and any order it produces goes
//!   out through an [`OrderSink`]
//!
//! [`Session::run`] multiplexes inputs and frames on one task. Inputs are
//! always drained before the next frame, so a frame never observes half an
//! event.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, trace, warn};

use crate::config::SimulationConfig;
use crate::core::clock::{Clock, SystemClock};
use crate::game::input::InputEvent;
use crate::game::render::Canvas;
use crate::game::scheduler::FrameScheduler;
use crate::game::state::{Diagnostics, Game};
use crate::game::tick::TickResult;
use crate::network::protocol::{
    InboundMessage, OrderRequest, OutboundMessage, ProtocolError, ServerOrder,
};

/// Session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Game input before the world snapshot.
    #[error("No GAME_INFO received yet")]
    NotStarted,

    /// Second world snapshot.
    #[error("GAME_INFO already received")]
    AlreadyStarted,

    /// Network task gone.
    #[error("Outbound channel closed")]
    ChannelClosed,

    /// Network task not keeping up.
    #[error("Outbound channel full")]
    Backpressure,

    /// Undecodable message.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the world snapshot.
    AwaitingGameInfo,
    /// Game running.
    Running,
    /// Stopped by the host or by a fault.
    Stopped,
}

// =============================================================================
// ORDER SINKS
// =============================================================================

/// Destination for locally issued orders.
pub trait OrderSink: Send {
    /// Send an order request.
    fn send(&mut self, request: OrderRequest) -> Result<(), SessionError>;

    /// Orders echoed back as authoritative without a round trip.
    fn echoed(&mut self) -> Vec<ServerOrder> {
        Vec::new()
    }
}

/// Forwards requests to a network task over a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<OutboundMessage>,
}

impl ChannelSink {
    /// Wrap a channel sender.
    pub fn new(tx: mpsc::Sender<OutboundMessage>) -> Self {
        Self { tx }
    }
}

impl OrderSink for ChannelSink {
    fn send(&mut self, request: OrderRequest) -> Result<(), SessionError> {
        self.tx
            .try_send(OutboundMessage::IssueOrder(request))
            .map_err(|e| match e {
                TrySendError::Full(_) => SessionError::Backpressure,
                TrySendError::Closed(_) => SessionError::ChannelClosed,
            })
    }
}

/// Local play: every request is immediately authoritative.
#[derive(Debug, Default)]
pub struct LoopbackSink {
    pending: Vec<ServerOrder>,
    sent: usize,
}

impl LoopbackSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests accepted so far.
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl OrderSink for LoopbackSink {
    fn send(&mut self, request: OrderRequest) -> Result<(), SessionError> {
        self.sent += 1;
        self.pending.push(request.into_order());
        Ok(())
    }

    fn echoed(&mut self) -> Vec<ServerOrder> {
        std::mem::take(&mut self.pending)
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Anything the run loop reacts to besides frames.
#[derive(Debug, Clone)]
pub enum SessionInput {
    /// Message from the network
    Network(InboundMessage),
    /// Host input event
    Local(InputEvent),
    /// Host canvas resized
    Resize {
        /// Canvas width in pixels
        width: f64,
        /// Canvas height in pixels
        height: f64,
    },
    /// End the run
    Stop,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames simulated
    pub frames: u64,
    /// Ended by a fault
    pub halted: bool,
}

/// One player's view of one game.
pub struct Session<S: OrderSink> {
    sink: S,
    config: SimulationConfig,
    width: f64,
    height: f64,
    clock: Box<dyn Clock>,
    state: SessionState,
    game: Option<Game>,
}

impl<S: OrderSink> Session<S> {
    /// New session for a `width` x `height` canvas.
    pub fn new(sink: S, config: SimulationConfig, width: f64, height: f64) -> Self {
        Self {
            sink,
            config,
            width,
            height,
            clock: Box::new(SystemClock),
            state: SessionState::AwaitingGameInfo,
            game: None,
        }
    }

    /// Replace the clock used to stamp unit creation.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The game, once started.
    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    /// Mutable game, once started.
    pub fn game_mut(&mut self) -> Option<&mut Game> {
        self.game.as_mut()
    }

    /// The order sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Game diagnostics, once started.
    pub fn diagnostics(&self) -> Option<Diagnostics> {
        self.game.as_ref().map(Game::diagnostics)
    }

    /// Apply a network message.
    pub fn handle_inbound(&mut self, message: InboundMessage) -> Result<(), SessionError> {
        match message {
            InboundMessage::GameInfo(info) => {
                if self.game.is_some() {
                    return Err(SessionError::AlreadyStarted);
                }
                let game = Game::from_game_info(
                    &info,
                    self.config.clone(),
                    self.width,
                    self.height,
                    self.clock.now_ms(),
                );
                self.game = Some(game);
                self.state = SessionState::Running;
                Ok(())
            }
            InboundMessage::IssueOrder(order) => {
                let game = self.game.as_mut().ok_or(SessionError::NotStarted)?;
                game.apply_order(&order);
                Ok(())
            }
        }
    }

    /// Decode and apply a JSON network message.
    pub fn handle_json(&mut self, json: &str) -> Result<(), SessionError> {
        let message = InboundMessage::from_json(json)?;
        self.handle_inbound(message)
    }

    /// Apply a host input event, sending any order it produces.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<(), SessionError> {
        let game = self.game.as_mut().ok_or(SessionError::NotStarted)?;

        if let Some(order) = game.handle_input(event) {
            let request = OrderRequest::new(game.game_id(), order);
            self.sink.send(request)?;
        }
        for order in self.sink.echoed() {
            game.apply_order(&order);
        }
        Ok(())
    }

    /// Resize the canvas, keeping pan and zoom.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        if let Some(game) = self.game.as_mut() {
            game.camera_mut().resize(width, height);
        }
    }

    /// Run one frame if the game is running.
    pub fn frame(&mut self, now_ms: i64, canvas: &mut dyn Canvas) -> Option<TickResult> {
        let game = self.game.as_mut()?;
        let result = game.frame(now_ms, canvas);
        for event in &result.events {
            trace!("Tick {} event {:?}", event.tick, event.data);
        }
        if game.is_stopped() {
            self.state = SessionState::Stopped;
        }
        Some(result)
    }

    /// Stop the game for good.
    pub fn stop(&mut self) {
        if let Some(game) = self.game.as_mut() {
            game.stop();
        }
        if self.state != SessionState::Stopped {
            info!("Session stopped");
        }
        self.state = SessionState::Stopped;
    }

    fn dispatch(&mut self, input: SessionInput) -> Result<(), SessionError> {
        let result = match input {
            SessionInput::Network(message) => self.handle_inbound(message),
            SessionInput::Local(event) => self.handle_input(event),
            SessionInput::Resize { width, height } => {
                self.resize(width, height);
                Ok(())
            }
            SessionInput::Stop => {
                self.stop();
                Ok(())
            }
        };

        match result {
            Err(SessionError::ChannelClosed) => Err(SessionError::ChannelClosed),
            Err(e) => {
                warn!("Dropped session input: {}", e);
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    /// Drive the session until the scheduler ends, a stop arrives, or the
    /// game halts.
    pub async fn run<F: FrameScheduler>(
        &mut self,
        scheduler: &mut F,
        inputs: &mut mpsc::Receiver<SessionInput>,
        canvas: &mut dyn Canvas,
    ) -> Result<RunSummary, SessionError> {
        let mut summary = RunSummary::default();
        let mut inputs_open = true;

        loop {
            if self.state == SessionState::Stopped {
                break;
            }

            tokio::select! {
                biased;
                input = inputs.recv(), if inputs_open => match input {
                    Some(input) => {
                        if let Err(e) = self.dispatch(input) {
                            self.stop();
                            return Err(e);
                        }
                    }
                    None => {
                        debug!("Input channel closed, running on frames only");
                        inputs_open = false;
                    }
                },
                frame = scheduler.next_frame() => match frame {
                    Some(now_ms) => {
                        if let Some(result) = self.frame(now_ms, canvas) {
                            summary.frames += 1;
                            if result.halted {
                                summary.halted = true;
                                break;
                            }
                        }
                    }
                    None => break,
                },
            }
        }

        self.stop();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::vec2::{Direction, Position};
    use crate::game::camera::ScreenPoint;
    use crate::game::entity::Team;
    use crate::game::input::PointerButton;
    use crate::game::render::DrawList;
    use crate::game::scheduler::SteppedScheduler;
    use crate::game::tank::Tank;
    use crate::network::protocol::OrderKind;

    const GAME_INFO: &str = r#"{
        "event": "GAME_INFO",
        "payload": {
            "game": {
                "id": "g1",
                "entities": [
                    {"type": "tank", "pos": [0, 0], "dir": [1, 0], "team": "red", "id": "r1"},
                    {"type": "tank", "pos": [300, 0], "dir": [-1, 0], "team": "blue", "id": "b1"}
                ]
            },
            "team": "red"
        }
    }"#;

    // 800x600 canvas at zoom 1: canvas (x, y) shows world (x - 400, y - 300)
    fn screen(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(x + 400.0, y + 300.0)
    }

    fn started<S: OrderSink>(sink: S) -> Session<S> {
        let mut session =
            Session::new(sink, SimulationConfig::default(), 800.0, 600.0).with_clock(ManualClock::new(0));
        session.handle_json(GAME_INFO).unwrap();
        session
    }

    fn select_and_order(target: ScreenPoint) -> Vec<SessionInput> {
        let from = screen(-20.0, -20.0);
        let to = screen(20.0, 20.0);
        vec![
            SessionInput::Local(InputEvent::PointerDown { button: PointerButton::Primary, at: from }),
            SessionInput::Local(InputEvent::PointerMove { at: to }),
            SessionInput::Local(InputEvent::PointerUp { button: PointerButton::Primary, at: to, shift: false }),
            SessionInput::Local(InputEvent::PointerDown { button: PointerButton::Secondary, at: target }),
            SessionInput::Local(InputEvent::PointerUp { button: PointerButton::Secondary, at: target, shift: false }),
        ]
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut session = Session::new(LoopbackSink::new(), SimulationConfig::default(), 800.0, 600.0);
        assert_eq!(session.state(), SessionState::AwaitingGameInfo);

        let early = r#"{"event":"ISSUE_ORDER","payload":{"ids":["r1"],"type":"MOVE","target":[0,0]}}"#;
        assert!(matches!(session.handle_json(early), Err(SessionError::NotStarted)));
        assert!(matches!(
            session.handle_input(InputEvent::AimKey { held: true }),
            Err(SessionError::NotStarted)
        ));

        session.handle_json(GAME_INFO).unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert!(matches!(session.handle_json(GAME_INFO), Err(SessionError::AlreadyStarted)));
        assert!(matches!(session.handle_json("{"), Err(SessionError::Protocol(_))));
    }

    #[test]
    fn test_loopback_order_applies_immediately() {
        let mut session = started(LoopbackSink::new());
        for input in select_and_order(screen(100.0, 50.0)) {
            session.dispatch(input).unwrap();
        }

        assert_eq!(session.sink().sent(), 1);
        let unit = session.game().unwrap().unit("r1").unwrap();
        assert_eq!(unit.move_target, Some(Position::new(100.0, 50.0)));
    }

    #[tokio::test]
    async fn test_channel_sink_emits_request() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut session = started(ChannelSink::new(tx));

        session.handle_input(InputEvent::AimKey { held: true }).unwrap();
        for input in select_and_order(screen(300.0, 0.0)) {
            session.dispatch(input).unwrap();
        }

        let OutboundMessage::IssueOrder(request) = rx.recv().await.unwrap();
        assert_eq!(request.game_id, "g1");
        assert_eq!(request.kind, OrderKind::Attack);
        assert_eq!(request.ids, vec!["r1".to_string()]);

        // Not applied until the server echoes it
        assert_eq!(session.game().unwrap().unit("r1").unwrap().fire_target, None);
        let echo = InboundMessage::IssueOrder(request.into_order());
        session.handle_inbound(echo).unwrap();
        assert_eq!(
            session.game().unwrap().unit("r1").unwrap().fire_target,
            Some(Position::new(300.0, 0.0))
        );
    }

    #[test]
    fn test_closed_channel_is_fatal() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut session = started(ChannelSink::new(tx));
        let inputs = select_and_order(screen(0.0, 100.0));
        let (last, rest) = inputs.split_last().unwrap();
        for input in rest {
            session.dispatch(input.clone()).unwrap();
        }
        assert!(matches!(session.dispatch(last.clone()), Err(SessionError::ChannelClosed)));
    }

    #[tokio::test]
    async fn test_run_stops_game_when_outbound_closes() {
        let (order_tx, order_rx) = mpsc::channel(1);
        drop(order_rx);
        let mut session = started(ChannelSink::new(order_tx));

        let (tx, mut rx) = mpsc::channel(16);
        for input in select_and_order(screen(0.0, 100.0)) {
            tx.send(input).await.unwrap();
        }

        let mut scheduler = SteppedScheduler::new(0, 16, 10);
        let mut canvas = DrawList::new();
        let result = session.run(&mut scheduler, &mut rx, &mut canvas).await;

        assert!(matches!(result, Err(SessionError::ChannelClosed)));
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(session.game().unwrap().is_stopped());
        assert_eq!(session.game().unwrap().tick(), 0);
    }

    #[tokio::test]
    async fn test_run_drains_inputs_before_frames() {
        let mut session = started(LoopbackSink::new());
        let (tx, mut rx) = mpsc::channel(16);
        for input in select_and_order(screen(100.0, 0.0)) {
            tx.send(input).await.unwrap();
        }
        drop(tx);

        let mut scheduler = SteppedScheduler::new(0, 16, 10);
        let mut canvas = DrawList::new();
        let summary = session.run(&mut scheduler, &mut rx, &mut canvas).await.unwrap();

        assert_eq!(summary, RunSummary { frames: 10, halted: false });
        assert_eq!(session.state(), SessionState::Stopped);
        // Straight ahead at 2 per frame
        let unit = session.game().unwrap().unit("r1").unwrap();
        assert_eq!(unit.pos(), Position::new(20.0, 0.0));
    }

    #[tokio::test]
    async fn test_run_stops_on_request() {
        let mut session = started(LoopbackSink::new());
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(SessionInput::Stop).await.unwrap();

        let mut scheduler = SteppedScheduler::new(0, 16, 100);
        let mut canvas = DrawList::new();
        let summary = session.run(&mut scheduler, &mut rx, &mut canvas).await.unwrap();

        assert_eq!(summary.frames, 0);
        assert!(session.game().unwrap().is_stopped());
    }

    #[tokio::test]
    async fn test_run_ends_on_halt() {
        let mut session = started(LoopbackSink::new());
        let broken = Tank::new("x", Team::Red, Position::new(f64::NAN, 0.0), Direction::UP, 0);
        session.game_mut().unwrap().units.push(broken);

        let (_tx, mut rx) = mpsc::channel(1);
        let mut scheduler = SteppedScheduler::new(0, 16, 100);
        let mut canvas = DrawList::new();
        let summary = session.run(&mut scheduler, &mut rx, &mut canvas).await.unwrap();

        assert_eq!(summary, RunSummary { frames: 1, halted: true });
        assert!(session.diagnostics().unwrap().halted);
    }

    #[test]
    fn test_resize_reaches_camera() {
        let mut session = started(LoopbackSink::new());
        session.dispatch(SessionInput::Resize { width: 1024.0, height: 768.0 }).unwrap();
        let camera = session.game().unwrap().camera();
        assert_eq!((camera.width, camera.height), (1024.0, 768.0));
    }
}
