//! Tank Battle headless driver
//!
//! Runs a local skirmish against a recording canvas: builds the scenario,
//! selects every unit, orders them forward and ticks at the configured
//! rate until the frame limit or Ctrl-C.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tank_battle::{
    RuntimeConfig, SimulationConfig, DeterministicRng, Position, Session, TICK_RATE, VERSION,
    core::clock::{Clock, SystemClock},
    game::{
        camera::ScreenPoint,
        entity::Team,
        input::{InputEvent, PointerButton},
        render::DrawList,
        scenario::skirmish,
        scheduler::IntervalScheduler,
    },
    network::{
        protocol::InboundMessage,
        session::{LoopbackSink, SessionInput},
    },
};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = RuntimeConfig::from_env()?;

    // RUST_LOG wins over LOG_LEVEL
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Tank Battle v{}", VERSION);
    info!("Tick Rate: {} Hz (default {})", config.tick_rate, TICK_RATE);
    info!("Canvas: {}x{}", config.canvas_width, config.canvas_height);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(run(config))
}

async fn run(config: RuntimeConfig) -> Result<()> {
    let seed = config.seed.unwrap_or_else(|| SystemClock.now_ms() as u64);
    info!("Scenario seed: {}", seed);

    let mut rng = DeterministicRng::new(seed);
    let game_info = skirmish(&mut rng, config.tanks, config.walls, Team::Red);

    let mut session = Session::new(
        LoopbackSink::new(),
        SimulationConfig::default(),
        config.canvas_width,
        config.canvas_height,
    );
    session.handle_inbound(InboundMessage::GameInfo(game_info))?;

    // Center the view on the formation
    let formation_x = 1000.0 + 50.0 * (config.tanks as f64 + 1.0);
    if let Some(game) = session.game_mut() {
        game.camera_mut().view_pos = Position::new(formation_x, 1000.0);
    }

    let (tx, mut rx) = mpsc::channel(64);
    for input in opening_moves(config.canvas_width, config.canvas_height) {
        tx.send(input).await?;
    }

    let frame_limit = (config.frames > 0).then_some(config.frames);
    let (mut scheduler, stop) = IntervalScheduler::new(config.tick_rate, frame_limit);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted");
            stop.stop();
        }
    });

    let mut canvas = DrawList::new();
    let summary = session.run(&mut scheduler, &mut rx, &mut canvas).await?;
    drop(tx);

    info!("=== Run Summary ===");
    info!("Frames: {}", summary.frames);
    if summary.halted {
        warn!("Simulation halted by a fault");
    }
    if let Some(diag) = session.diagnostics() {
        info!("Units: {}, shells: {}, craters: {}", diag.units, diag.shells, diag.craters);
        info!("Last frame: {} draw calls", canvas.len());
        info!("Final State Hash: {}", diag.state_hash);
    }

    Ok(())
}

/// Box-select the whole canvas, then send everything 250 px up.
fn opening_moves(width: f64, height: f64) -> Vec<SessionInput> {
    let from = ScreenPoint::new(0.0, 0.0);
    let to = ScreenPoint::new(width, height);
    let target = ScreenPoint::new(width / 2.0, height / 2.0 + 250.0);

    [
        InputEvent::PointerDown { button: PointerButton::Primary, at: from },
        InputEvent::PointerMove { at: to },
        InputEvent::PointerUp { button: PointerButton::Primary, at: to, shift: false },
        InputEvent::PointerMove { at: target },
        InputEvent::PointerDown { button: PointerButton::Secondary, at: target },
        InputEvent::PointerUp { button: PointerButton::Secondary, at: target, shift: false },
    ]
    .into_iter()
    .map(SessionInput::Local)
    .collect()
}
