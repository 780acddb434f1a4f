//! Projectile Ballistics
//!
//! A shell flies in a straight line at a fixed speed toward a fixed target.
//! On the tick where the remaining distance is no more than one step, it
//! lands exactly on the target and reports arrival.

use tracing::trace;
use uuid::Uuid;

use crate::core::shape::Outline;
use crate::core::vec2::{Direction, Position};
use crate::game::camera::ViewRect;
use crate::game::entity::{BareEntity, Command, Entity, EntityKind, TickContext};
use crate::game::render::{Color, Painter};
use crate::game::tick::SimulationFault;

const SHELL_OUTLINE: Outline<4> = Outline::new([[3.0, 2.0], [-3.0, 2.0], [-3.0, -2.0], [3.0, -2.0]]);

/// Culling margin around the shell center.
const FOV_MARGIN: f64 = 5.0;

/// A projectile in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Shell {
    /// Unique id
    pub id: Uuid,
    /// Current position
    pub pos: Position,
    /// Heading at the time of firing
    pub dir: Direction,
    /// Impact point
    pub target: Position,
    /// Travel per tick
    pub velocity: f64,
    arrived: bool,
}

impl Shell {
    /// New shell at `pos`.
    pub fn new(pos: Position, dir: Direction, target: Position, velocity: f64) -> Self {
        Self::with_id(Uuid::new_v4(), pos, dir, target, velocity)
    }

    /// New shell with a caller-chosen id.
    pub fn with_id(id: Uuid, pos: Position, dir: Direction, target: Position, velocity: f64) -> Self {
        Self { id, pos, dir, target, velocity, arrived: false }
    }

    /// Restore from a snapshot.
    pub fn from_snapshot(pos: [f64; 2], dir: [f64; 2], target: [f64; 2], velocity: f64) -> Self {
        Self::new(
            Position::from_raw(pos),
            Direction::from_raw(dir),
            Position::from_raw(target),
            velocity,
        )
    }

    /// Distance left to the target.
    pub fn remaining(&self) -> f64 {
        self.pos.distance_to(self.target)
    }

    /// True once the shell has landed.
    pub fn has_arrived(&self) -> bool {
        self.arrived
    }
}

impl Entity for Shell {
    fn kind(&self) -> EntityKind {
        EntityKind::Shell
    }

    fn snapshot(&self) -> BareEntity {
        BareEntity::Shell {
            pos: self.pos.raw(),
            dir: self.dir.raw(),
            target: self.target.raw(),
            velocity: self.velocity,
        }
    }

    fn in_fov(&self, view: &ViewRect) -> bool {
        view.contains(self.pos, FOV_MARGIN)
    }

    fn render(&self, painter: &mut Painter<'_>) {
        let outline = SHELL_OUTLINE.place(self.pos, self.dir);
        painter.polygon(&outline, Color::SHELL);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<(), SimulationFault> {
        if self.arrived {
            return Ok(());
        }

        if self.remaining() <= self.velocity {
            self.pos = self.target;
            self.arrived = true;
            trace!("Shell {} arrived at {}", self.id, self.pos);
            ctx.push(Command::ShellArrived {
                shell_id: self.id,
                impact: self.pos,
                trajectory: self.dir,
            });
        } else {
            self.pos = self.pos + self.dir.scale(self.velocity);
        }

        if !self.pos.is_finite() {
            return Err(SimulationFault::NonFinite {
                entity: EntityKind::Shell,
                id: self.id.to_string(),
            });
        }
        Ok(())
    }
}
