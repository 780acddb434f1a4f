//! # Tank Battle
//!
//! Simulation kernel for a top-down tank battle: units steer on two treads,
//! line up on targets and fire shells that either knock out a unit or leave
//! a crater.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TANK BATTLE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Geometry and support primitives           │
//! │  ├── vec2.rs     - Position / Direction vectors              │
//! │  ├── lines.rs    - Line, ray and segment intersection        │
//! │  ├── shape.rs    - Outlines and oriented rectangles          │
//! │  ├── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │  ├── hash.rs     - World-state digests                       │
//! │  └── clock.rs    - Millisecond clocks                        │
//! │                                                              │
//! │  game/           - Entities and the frame loop               │
//! │  ├── tank.rs     - Unit state machine                        │
//! │  ├── shell.rs    - Ballistics                                │
//! │  ├── world.rs    - Walls, trees, craters, cursor             │
//! │  ├── input.rs    - Selection, pan, order requests            │
//! │  ├── state.rs    - Game orchestrator                         │
//! │  ├── tick.rs     - Fixed-order frame, fail-stop              │
//! │  └── render.rs   - Canvas abstraction                        │
//! │                                                              │
//! │  network/        - Wire messages and session loop            │
//! │  ├── protocol.rs - GAME_INFO / ISSUE_ORDER                   │
//! │  └── session.rs  - Inbound events, outbound orders           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frame Model
//!
//! Everything runs on one task. Network messages and input events are
//! applied between frames; a frame updates every entity and then paints.
//! If any update fails the frame is not painted and the game halts.
//!
//! World coordinates are y-up. Canvas coordinates share that orientation
//! with the origin at the bottom-left; flipping for a y-down surface is
//! the host canvas' job.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::config::{RuntimeConfig, SimulationConfig};
pub use crate::core::vec2::{Direction, Position};
pub use crate::core::rng::DeterministicRng;
pub use crate::game::state::Game;
pub use crate::game::tick::TickResult;
pub use crate::network::session::Session;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default frame rate (Hz)
pub const TICK_RATE: u32 = 60;
