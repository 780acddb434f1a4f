//! Game State
//!
//! The orchestrator owns every entity collection, the camera and the
//! selection. Units are kept in a `Vec` in snapshot order so hit
//! resolution and selection walk them deterministically.

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::vec2::Position;
use crate::game::camera::Camera;
use crate::game::collision::units_selected_by;
use crate::game::entity::{BareEntity, Entity, Team};
use crate::game::events::GameEvent;
use crate::game::input::PointerState;
use crate::game::shell::Shell;
use crate::game::tank::{Selection, Tank};
use crate::game::world::{Crater, Cursor, CursorType, Obstacle};
use crate::network::protocol::{GameInfo, GameSnapshot, OrderKind, ServerOrder};

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// Read-only view of the running game for logs and tooling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Session id
    pub game_id: String,
    /// Frames simulated
    pub tick: u64,
    /// Live units
    pub units: usize,
    /// Shells in flight
    pub shells: usize,
    /// Craters still fading
    pub craters: usize,
    /// Walls and trees
    pub obstacles: usize,
    /// Selected unit ids in unit order
    pub selected: Vec<String>,
    /// Stopped by a fault
    pub halted: bool,
    /// Stopped by a fault or by the host
    pub stopped: bool,
    /// Current zoom
    pub zoom: f64,
    /// Hex SHA-256 of the world state
    pub state_hash: String,
}

// =============================================================================
// GAME
// =============================================================================

/// Simulation orchestrator.
#[derive(Debug)]
pub struct Game {
    pub(crate) game_id: String,
    pub(crate) team: Team,
    pub(crate) config: SimulationConfig,
    pub(crate) camera: Camera,
    pub(crate) units: Vec<Tank>,
    pub(crate) shells: Vec<Shell>,
    pub(crate) craters: Vec<Crater>,
    pub(crate) obstacles: Vec<Obstacle>,
    pub(crate) cursor: Cursor,
    pub(crate) pointer: PointerState,
    pub(crate) tick: u64,
    pub(crate) halted: bool,
    pub(crate) stopped: bool,
    pub(crate) events: Vec<GameEvent>,
}

impl Game {
    /// Empty world with the camera on the origin.
    pub fn new(game_id: impl Into<String>, team: Team, config: SimulationConfig, width: f64, height: f64) -> Self {
        Self {
            game_id: game_id.into(),
            team,
            config,
            camera: Camera::new(width, height),
            units: Vec::new(),
            shells: Vec::new(),
            craters: Vec::new(),
            obstacles: Vec::new(),
            cursor: Cursor::default(),
            pointer: PointerState::default(),
            tick: 0,
            halted: false,
            stopped: false,
            events: Vec::new(),
        }
    }

    /// Build the world from a `GAME_INFO` snapshot.
    ///
    /// Cursor entries are ignored; the local cursor is created fresh.
    pub fn from_game_info(info: &GameInfo, config: SimulationConfig, width: f64, height: f64, now_ms: i64) -> Self {
        let mut game = Self::new(info.game.id.clone(), info.team, config, width, height);

        for bare in &info.game.entities {
            match bare {
                BareEntity::Tank { pos, dir, team, id } => {
                    game.units.push(Tank::from_snapshot(*pos, *dir, *team, id, now_ms));
                }
                BareEntity::Wall { .. } | BareEntity::Tree { .. } => {
                    game.obstacles.extend(Obstacle::from_snapshot(bare));
                }
                BareEntity::Shell { pos, dir, target, velocity } => {
                    game.shells.push(Shell::from_snapshot(*pos, *dir, *target, *velocity));
                }
                BareEntity::Crater { pos, created_at } => {
                    let lifetime = game.config.crater_lifetime_ms;
                    game.craters.push(Crater::new(Position::from_raw(*pos), *created_at, lifetime));
                }
                BareEntity::Cursor { .. } => {}
            }
        }

        info!(
            "Game {} started for team {}: {} units, {} obstacles, {} shells, {} craters",
            game.game_id,
            game.team,
            game.units.len(),
            game.obstacles.len(),
            game.shells.len(),
            game.craters.len()
        );
        game
    }

    // ----- accessors -----

    /// Session id.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Local player's team.
    pub fn team(&self) -> Team {
        self.team
    }

    /// Gameplay constants.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Frames simulated so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Live units in snapshot order.
    pub fn units(&self) -> &[Tank] {
        &self.units
    }

    /// Unit by id.
    pub fn unit(&self, id: &str) -> Option<&Tank> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Shells in flight.
    pub fn shells(&self) -> &[Shell] {
        &self.shells
    }

    /// Craters still fading.
    pub fn craters(&self) -> &[Crater] {
        &self.craters
    }

    /// Walls and trees.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Local cursor.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// View transform.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable view transform, e.g. for host resizes.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Gesture state.
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// True once a frame faulted.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// True once the game will never tick again.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    // ----- orders -----

    /// Apply an authoritative order to the matching units.
    ///
    /// Unknown ids are skipped. Returns the number of units affected.
    pub fn apply_order(&mut self, order: &ServerOrder) -> usize {
        if self.stopped {
            return 0;
        }

        let target = order.target_position();
        let mut applied = Vec::new();
        for unit in self.units.iter_mut().filter(|u| order.ids.contains(&u.id)) {
            match order.kind {
                OrderKind::Move => unit.order_move(target),
                OrderKind::Attack => unit.order_attack(target),
            }
            applied.push(unit.id.clone());
        }

        debug!(
            "Applied {:?} to {} of {} units at {}",
            order.kind,
            applied.len(),
            order.ids.len(),
            target
        );
        let count = applied.len();
        self.events.push(GameEvent::order_applied(self.tick, order.kind, applied, target));
        count
    }

    // ----- selection -----

    /// Mark friendly units matched by `selection` as selected.
    pub fn select(&mut self, selection: &Selection) {
        for index in units_selected_by(&self.units, self.team, selection) {
            self.units[index].selected = true;
        }
    }

    /// Deselect every unit.
    pub fn clear_selection(&mut self) {
        for unit in &mut self.units {
            unit.selected = false;
        }
    }

    /// True if any unit is selected.
    pub fn has_selection(&self) -> bool {
        self.units.iter().any(|u| u.selected)
    }

    /// Ids of selected units in unit order.
    pub fn selected_ids(&self) -> Vec<String> {
        self.units.iter().filter(|u| u.selected).map(|u| u.id.clone()).collect()
    }

    pub(crate) fn refresh_cursor(&mut self) {
        self.cursor.cursor_type = match (self.has_selection(), self.pointer.aiming) {
            (false, _) => CursorType::Default,
            (true, false) => CursorType::Move,
            (true, true) => CursorType::Attack,
        };
    }

    // ----- removal -----

    /// Remove a unit, dropping it from the selection.
    pub fn destroy_unit(&mut self, id: &str) -> bool {
        let Some(index) = self.units.iter().position(|u| u.id == id) else {
            return false;
        };
        let mut unit = self.units.remove(index);
        unit.cleanup();
        info!("Unit {} ({}) destroyed at tick {}", unit.id, unit.team, self.tick);
        self.events.push(GameEvent::unit_destroyed(self.tick, unit.id));
        true
    }

    /// Stop for good and release entity resources.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.pointer = PointerState::default();

        for unit in &mut self.units {
            unit.cleanup();
        }
        for shell in &mut self.shells {
            shell.cleanup();
        }
        for crater in &mut self.craters {
            crater.cleanup();
        }
        for obstacle in &mut self.obstacles {
            obstacle.cleanup();
        }
        self.cursor.cleanup();

        info!("Game {} stopped at tick {}", self.game_id, self.tick);
    }

    // ----- introspection -----

    /// Current world as a wire snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        let entities = self
            .units
            .iter()
            .map(Entity::snapshot)
            .chain(self.obstacles.iter().map(Entity::snapshot))
            .chain(self.shells.iter().map(Entity::snapshot))
            .chain(self.craters.iter().map(Entity::snapshot))
            .chain(std::iter::once(self.cursor.snapshot()))
            .collect();
        GameSnapshot { id: self.game_id.clone(), entities }
    }

    /// SHA-256 digest of the simulated state.
    pub fn state_hash(&self) -> StateHash {
        compute_state_hash(self.tick, |h| {
            h.update_u64(self.units.len() as u64);
            for unit in &self.units {
                h.update_str(&unit.id);
                h.update_str(unit.team.as_str());
                h.update_position(unit.pos());
                h.update_direction(unit.dir());
                h.update_opt_position(unit.move_target);
                h.update_opt_position(unit.fire_target);
                h.update_bool(unit.is_damaged());
                h.update_i64(unit.cooldown_ms());
            }

            h.update_u64(self.shells.len() as u64);
            for shell in &self.shells {
                h.update_position(shell.pos);
                h.update_position(shell.target);
                h.update_f64(shell.velocity);
            }

            h.update_u64(self.craters.len() as u64);
            for crater in &self.craters {
                h.update_position(crater.pos);
                h.update_i64(crater.created_at);
            }

            h.update_u64(self.obstacles.len() as u64);
            for obstacle in &self.obstacles {
                match obstacle {
                    Obstacle::Wall(wall) => {
                        h.update_u8(0);
                        h.update_position(wall.start);
                        h.update_position(wall.end);
                    }
                    Obstacle::Tree(tree) => {
                        h.update_u8(1);
                        h.update_position(tree.pos);
                    }
                }
            }
        })
    }

    /// Counts, flags and digest.
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            game_id: self.game_id.clone(),
            tick: self.tick,
            units: self.units.len(),
            shells: self.shells.len(),
            craters: self.craters.len(),
            obstacles: self.obstacles.len(),
            selected: self.selected_ids(),
            halted: self.halted,
            stopped: self.stopped,
            zoom: self.camera.zoom,
            state_hash: hex::encode(self.state_hash()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::EntityKind;
    use crate::game::events::GameEventData;

    fn info() -> GameInfo {
        let json = r#"{
            "game": {
                "id": "g1",
                "entities": [
                    {"type": "tank", "pos": [0, 0], "dir": [1, 0], "team": "red", "id": "r1"},
                    {"type": "tank", "pos": [100, 0], "dir": [-1, 0], "team": "blue", "id": "b1"},
                    {"type": "wall", "start": [0, 50], "end": [100, 50]},
                    {"type": "tree", "pos": [30, -40]},
                    {"type": "shell", "pos": [0, 0], "dir": [0, 1], "target": [0, 300], "velocity": 50},
                    {"type": "crater", "pos": [7, 7], "createdAt": 1000},
                    {"type": "cursor", "pos": [1, 1]}
                ]
            },
            "team": "red"
        }"#;
        serde_json::from_str(json).unwrap()
    }

    fn game() -> Game {
        Game::from_game_info(&info(), SimulationConfig::default(), 800.0, 600.0, 0)
    }

    #[test]
    fn test_from_game_info() {
        let game = game();
        assert_eq!(game.game_id(), "g1");
        assert_eq!(game.team(), Team::Red);
        assert_eq!(game.units().len(), 2);
        assert_eq!(game.obstacles().len(), 2);
        assert_eq!(game.shells().len(), 1);
        assert_eq!(game.craters().len(), 1);
        assert_eq!(game.craters()[0].created_at, 1000);
        assert_eq!(game.obstacles()[1].kind(), EntityKind::Tree);
    }

    #[test]
    fn test_apply_order_targets_listed_units() {
        let mut game = game();
        let order = ServerOrder::new(vec!["r1".into(), "ghost".into()], OrderKind::Move, Position::new(5.0, 5.0));
        assert_eq!(game.apply_order(&order), 1);
        assert_eq!(game.unit("r1").unwrap().move_target, Some(Position::new(5.0, 5.0)));
        assert_eq!(game.unit("b1").unwrap().move_target, None);

        let attack = ServerOrder::new(vec!["r1".into()], OrderKind::Attack, Position::new(9.0, 9.0));
        game.apply_order(&attack);
        let unit = game.unit("r1").unwrap();
        assert_eq!(unit.move_target, None);
        assert_eq!(unit.fire_target, Some(Position::new(9.0, 9.0)));

        assert!(matches!(
            &game.events[0].data,
            GameEventData::OrderApplied { unit_ids, .. } if unit_ids == &vec!["r1".to_string()]
        ));
    }

    #[test]
    fn test_destroy_unit_deselects() {
        let mut game = game();
        game.select(&Selection::Point(Position::new(1.0, 1.0)));
        assert_eq!(game.selected_ids(), vec!["r1".to_string()]);

        assert!(game.destroy_unit("r1"));
        assert!(game.selected_ids().is_empty());
        assert!(!game.destroy_unit("r1"));
    }

    #[test]
    fn test_selection_is_team_scoped() {
        let mut game = game();
        game.select(&Selection::Point(Position::new(101.0, 1.0)));
        assert!(!game.has_selection());
    }

    #[test]
    fn test_cursor_type_follows_selection() {
        let mut game = game();
        game.refresh_cursor();
        assert_eq!(game.cursor().cursor_type, CursorType::Default);

        game.select(&Selection::Point(Position::ORIGIN));
        game.refresh_cursor();
        assert_eq!(game.cursor().cursor_type, CursorType::Move);

        game.pointer.aiming = true;
        game.refresh_cursor();
        assert_eq!(game.cursor().cursor_type, CursorType::Attack);
    }

    #[test]
    fn test_snapshot_round_trips_world() {
        let game = game();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.id, "g1");
        // 2 units, 2 obstacles, 1 shell, 1 crater, cursor
        assert_eq!(snapshot.entities.len(), 7);

        let info = GameInfo { game: snapshot, team: Team::Red };
        let rebuilt = Game::from_game_info(&info, SimulationConfig::default(), 800.0, 600.0, 0);
        assert_eq!(rebuilt.state_hash(), game.state_hash());
    }

    #[test]
    fn test_state_hash_tracks_orders() {
        let mut game = game();
        let before = game.state_hash();
        game.apply_order(&ServerOrder::new(vec!["b1".into()], OrderKind::Move, Position::ORIGIN));
        assert_ne!(game.state_hash(), before);
    }

    #[test]
    fn test_stop_rejects_orders() {
        let mut game = game();
        game.stop();
        assert!(game.is_stopped());
        assert!(!game.is_halted());
        let order = ServerOrder::new(vec!["r1".into()], OrderKind::Move, Position::ORIGIN);
        assert_eq!(game.apply_order(&order), 0);
    }

    #[test]
    fn test_diagnostics() {
        let game = game();
        let diag = game.diagnostics();
        assert_eq!(diag.units, 2);
        assert_eq!(diag.shells, 1);
        assert_eq!(diag.state_hash.len(), 64);
        assert!(!diag.stopped);
    }
}
