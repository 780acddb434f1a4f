//! Core geometry and support primitives.
//!
//! Nothing in this module knows about tanks or games: vectors, intersection
//! math, oriented shapes, seeded randomness, hashing and clocks.

pub mod vec2;
pub mod lines;
pub mod shape;
pub mod rng;
pub mod hash;
pub mod clock;

// Re-export core types
pub use vec2::{ConversionError, Direction, Position, RawVector, Vector, VectorKind};
pub use lines::{intersect, Construct, Line, Ray, Segment};
pub use shape::{OrientedRect, Outline};
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash, StateHasher};
pub use clock::{Clock, ManualClock, SystemClock};
