//! Game Logic Module
//!
//! Entities, the per-frame orchestrator and everything it drives.
//!
//! ## Module Structure
//!
//! - `entity`: wire schema and the `Entity` capability trait
//! - `tank`: unit state machine and tread steering
//! - `shell`: projectile ballistics
//! - `world`: walls, trees, craters and the cursor
//! - `camera`: world/canvas transform
//! - `input`: pointer gestures, selection and order requests
//! - `collision`: hit tests across the unit list
//! - `state`: the `Game` orchestrator
//! - `tick`: fixed-order frame and fail-stop
//! - `render`: canvas abstraction and painter
//! - `scheduler`: frame timing
//! - `scenario`: local skirmish setup
//! - `events`: per-frame event log

pub mod entity;
pub mod tank;
pub mod shell;
pub mod world;
pub mod camera;
pub mod input;
pub mod collision;
pub mod state;
pub mod tick;
pub mod render;
pub mod scheduler;
pub mod scenario;
pub mod events;

// Re-export key types
pub use entity::{BareEntity, Entity, EntityKind, Team};
pub use tank::{Maneuver, Tank};
pub use shell::Shell;
pub use world::{Crater, Cursor, CursorType, Obstacle, Tree, Wall};
pub use camera::{Camera, ScreenPoint};
pub use input::{InputEvent, PointerButton};
pub use state::{Diagnostics, Game};
pub use tick::{SimulationFault, TickResult};
pub use render::{Canvas, DrawList};
pub use scheduler::{FrameScheduler, IntervalScheduler, SteppedScheduler, StopHandle};
pub use events::{GameEvent, GameEventData};
