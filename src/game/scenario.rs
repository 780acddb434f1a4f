//! Local skirmish setup.
//!
//! Builds the `GAME_INFO` a single local player starts from: a row of
//! friendly tanks facing up and a handful of randomly placed walls.

use crate::core::rng::DeterministicRng;
use crate::core::vec2::{Direction, Position};
use crate::game::entity::{BareEntity, Team};
use crate::network::protocol::{GameInfo, GameSnapshot};

/// Width of the area walls are scattered over.
pub const FIELD_WIDTH: f64 = 1500.0;

/// Height of the area walls are scattered over.
pub const FIELD_HEIGHT: f64 = 1000.0;

/// Snapshot for a local game with `tanks` units and `walls` walls.
///
/// Unit `i` starts at `(100 * (i + 1) + 1000, 1000)` heading up.
pub fn skirmish(rng: &mut DeterministicRng, tanks: usize, walls: usize, team: Team) -> GameInfo {
    let mut entities = Vec::with_capacity(tanks + walls);

    for i in 0..tanks {
        let pos = Position::new(100.0 * (i as f64 + 1.0) + 1000.0, 1000.0);
        entities.push(BareEntity::Tank {
            pos: pos.raw(),
            dir: Direction::UP.raw(),
            team,
            id: rng.next_uuid().to_string(),
        });
    }

    for _ in 0..walls {
        let start = rng.random_position(FIELD_WIDTH, FIELD_HEIGHT);
        let end = rng.random_position(FIELD_WIDTH, FIELD_HEIGHT);
        entities.push(BareEntity::Wall { start: start.raw(), end: end.raw() });
    }

    GameInfo {
        game: GameSnapshot { id: rng.next_uuid().to_string(), entities },
        team,
    }
}
