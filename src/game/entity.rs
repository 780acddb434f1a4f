//! Entity Model
//!
//! [`BareEntity`] is the wire/debug snapshot schema. [`Entity`] is the
//! capability every live object implements so the orchestrator can update,
//! cull, paint and snapshot heterogeneous collections uniformly.
//!
//! Entities never hold a reference back to the game. Anything that must
//! change the game's collections (firing, shell arrival, crater expiry) is
//! pushed onto the [`TickContext`] as a [`Command`] and applied by the
//! orchestrator once the phase finishes.

use std::fmt;

use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::config::SimulationConfig;
use crate::core::vec2::{Direction, Position, RawVector};
use crate::game::camera::ViewRect;
use crate::game::render::{Color, Painter};
use crate::game::shell::Shell;
use crate::game::tick::SimulationFault;

// =============================================================================
// SNAPSHOT SCHEMA
// =============================================================================

/// Side a unit fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// Red side
    Red,
    /// Blue side
    Blue,
}

impl Team {
    /// Flag color.
    pub fn color(self) -> Color {
        match self {
            Team::Red => Color::Css("red"),
            Team::Blue => Color::Css("blue"),
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Team::Red => "red",
            Team::Blue => "blue",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized entity, discriminated by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BareEntity {
    /// A unit
    Tank {
        /// Center
        pos: RawVector,
        /// Heading
        dir: RawVector,
        /// Owner
        team: Team,
        /// Unit id
        id: String,
    },
    /// A wall segment
    Wall {
        /// First endpoint
        start: RawVector,
        /// Second endpoint
        end: RawVector,
    },
    /// A projectile in flight
    Shell {
        /// Current position
        pos: RawVector,
        /// Heading
        dir: RawVector,
        /// Impact point
        target: RawVector,
        /// Travel per tick
        velocity: f64,
    },
    /// Impact mark
    Crater {
        /// Center
        pos: RawVector,
        /// Creation time, ms since epoch
        #[serde(rename = "createdAt")]
        created_at: i64,
    },
    /// A tree
    Tree {
        /// Center
        pos: RawVector,
    },
    /// The pointer
    Cursor {
        /// Canvas position
        pos: RawVector,
    },
}

impl BareEntity {
    /// Kind of entity this snapshot describes.
    pub fn kind(&self) -> EntityKind {
        match self {
            BareEntity::Tank { .. } => EntityKind::Tank,
            BareEntity::Wall { .. } => EntityKind::Wall,
            BareEntity::Shell { .. } => EntityKind::Shell,
            BareEntity::Crater { .. } => EntityKind::Crater,
            BareEntity::Tree { .. } => EntityKind::Tree,
            BareEntity::Cursor { .. } => EntityKind::Cursor,
        }
    }
}

/// Entity discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Unit
    Tank,
    /// Wall obstacle
    Wall,
    /// Projectile
    Shell,
    /// Impact mark
    Crater,
    /// Tree obstacle
    Tree,
    /// Pointer
    Cursor,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Tank => "tank",
            EntityKind::Wall => "wall",
            EntityKind::Shell => "shell",
            EntityKind::Crater => "crater",
            EntityKind::Tree => "tree",
            EntityKind::Cursor => "cursor",
        };
        f.write_str(name)
    }
}

// =============================================================================
// TICK CONTEXT
// =============================================================================

/// Deferred mutation requested by an entity during update.
#[derive(Clone, Debug)]
pub enum Command {
    /// A unit fired; add the shell to the live set.
    Fire {
        /// Firing unit id
        shooter: String,
        /// The new projectile
        shell: Shell,
    },
    /// A shell reached its target and must be resolved.
    ShellArrived {
        /// Shell id
        shell_id: Uuid,
        /// Impact point
        impact: Position,
        /// Shell heading
        trajectory: Direction,
    },
    /// A transient entity expired.
    RemoveStatic {
        /// Crater id
        id: Uuid,
    },
}

/// Per-phase view of the world handed to `Entity::update`.
pub struct TickContext<'a> {
    /// Frame timestamp, ms since epoch
    pub now_ms: i64,
    /// Gameplay constants
    pub config: &'a SimulationConfig,
    commands: Vec<Command>,
}

impl<'a> TickContext<'a> {
    /// Create an empty context.
    pub fn new(now_ms: i64, config: &'a SimulationConfig) -> Self {
        Self { now_ms, config, commands: Vec::new() }
    }

    /// Queue a command.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Take all queued commands, in push order.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

// =============================================================================
// ENTITY CAPABILITY
// =============================================================================

/// Capabilities shared by everything the orchestrator owns.
pub trait Entity {
    /// Discriminant.
    fn kind(&self) -> EntityKind;

    /// Serializable snapshot.
    fn snapshot(&self) -> BareEntity;

    /// True if the entity may be visible in `view`.
    fn in_fov(&self, view: &ViewRect) -> bool;

    /// Paint the entity.
    fn render(&self, painter: &mut Painter<'_>);

    /// Advance one tick. Static entities keep the default.
    fn update(&mut self, _ctx: &mut TickContext<'_>) -> Result<(), SimulationFault> {
        Ok(())
    }

    /// Release resources when the game stops.
    fn cleanup(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tank_snapshot_json() {
        let json = r#"{"type":"tank","pos":[1.0,2.0],"dir":[0.0,1.0],"team":"red","id":"t1"}"#;
        let bare: BareEntity = serde_json::from_str(json).unwrap();
        assert_eq!(
            bare,
            BareEntity::Tank { pos: [1.0, 2.0], dir: [0.0, 1.0], team: Team::Red, id: "t1".to_string() }
        );
        assert_eq!(bare.kind(), EntityKind::Tank);
    }

    #[test]
    fn test_crater_uses_camel_case_timestamp() {
        let bare = BareEntity::Crater { pos: [0.0, 0.0], created_at: 1234 };
        let json = serde_json::to_value(&bare).unwrap();
        assert_eq!(json["type"], "crater");
        assert_eq!(json["createdAt"], 1234);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = r#"{"type":"boulder","pos":[0,0]}"#;
        assert!(serde_json::from_str::<BareEntity>(json).is_err());
    }

    #[test]
    fn test_integer_coordinates_accepted() {
        let json = r#"{"type":"wall","start":[0,0],"end":[10,5]}"#;
        let bare: BareEntity = serde_json::from_str(json).unwrap();
        assert_eq!(bare, BareEntity::Wall { start: [0.0, 0.0], end: [10.0, 5.0] });
    }

    #[test]
    fn test_context_drains_in_order() {
        let config = SimulationConfig::default();
        let mut ctx = TickContext::new(0, &config);
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        ctx.push(Command::RemoveStatic { id: a });
        ctx.push(Command::RemoveStatic { id: b });

        let ids: Vec<Uuid> = ctx
            .take_commands()
            .into_iter()
            .map(|c| match c {
                Command::RemoveStatic { id } => id,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(ids, vec![a, b]);
        assert!(ctx.take_commands().is_empty());
    }
}
