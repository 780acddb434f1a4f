//! Simulation Frame
//!
//! One call to [`Game::frame`] runs a full frame in fixed order:
//!
//! 1. advance shells, then resolve arrivals (hit units or leave a crater)
//! 2. advance surviving units, then add the shells they fired
//! 3. age craters and drop the expired ones
//! 4. paint obstacles, craters and shells
//! 5. paint units
//! 6. paint the cursor
//! 7. paint the selection box in progress
//! 8. paint the reference grid
//!
//! Painting only starts once every update succeeded. Any fault, including
//! a panic inside an entity, is logged and halts the game for good.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::{debug, error, trace};

use crate::core::vec2::{ConversionError, Direction, Position};
use crate::game::collision::units_containing;
use crate::game::entity::{Command, Entity, EntityKind, TickContext};
use crate::game::events::GameEvent;
use crate::game::render::{Canvas, Color, Painter, Stroke};
use crate::game::state::Game;
use crate::game::tank::HitOutcome;
use crate::game::world::Crater;

/// A frame that could not complete.
#[derive(Debug, Error)]
pub enum SimulationFault {
    /// A direction was used as a location or the reverse.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// An entity position or heading became NaN or infinite.
    #[error("{entity} {id} left the finite plane")]
    NonFinite {
        /// Entity kind
        entity: EntityKind,
        /// Entity id
        id: String,
    },

    /// An entity update panicked.
    #[error("Panic during update: {0}")]
    Panicked(String),
}

/// Result of a frame.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events since the previous frame, ordered by tick then priority
    pub events: Vec<GameEvent>,
    /// Whether the game is halted after this frame
    pub halted: bool,
    /// Whether this frame was painted
    pub rendered: bool,
}

/// Run `update`, turning a panic into a fault.
pub fn guarded<F>(update: F) -> Result<(), SimulationFault>
where
    F: FnOnce() -> Result<(), SimulationFault>,
{
    match panic::catch_unwind(AssertUnwindSafe(update)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(SimulationFault::Panicked(message))
        }
    }
}

impl Game {
    /// Advance one frame and paint it onto `canvas`.
    ///
    /// A halted or stopped game does nothing.
    pub fn frame(&mut self, now_ms: i64, canvas: &mut dyn Canvas) -> TickResult {
        if self.halted || self.stopped {
            return TickResult { events: Vec::new(), halted: self.halted, rendered: false };
        }

        let outcome = guarded(|| self.update(now_ms));
        let rendered = match outcome {
            Ok(()) => {
                self.render(now_ms, canvas);
                true
            }
            Err(fault) => {
                self.halt(fault);
                false
            }
        };

        let mut events = std::mem::take(&mut self.events);
        events.sort();
        TickResult { events, halted: self.halted, rendered }
    }

    /// Update phases only.
    pub fn update(&mut self, now_ms: i64) -> Result<(), SimulationFault> {
        self.tick += 1;
        self.refresh_cursor();

        // Shells land before units act, so a unit destroyed this frame
        // never fires and a fresh shell waits a frame before moving
        let mut ctx = TickContext::new(now_ms, &self.config);
        for shell in &mut self.shells {
            shell.update(&mut ctx)?;
        }
        let commands = ctx.take_commands();
        self.apply_commands(commands, now_ms)?;

        let mut ctx = TickContext::new(now_ms, &self.config);
        for unit in &mut self.units {
            unit.update(&mut ctx)?;
        }
        let commands = ctx.take_commands();
        self.apply_commands(commands, now_ms)?;

        let mut ctx = TickContext::new(now_ms, &self.config);
        for crater in &mut self.craters {
            crater.update(&mut ctx)?;
        }
        let commands = ctx.take_commands();
        self.apply_commands(commands, now_ms)?;

        Ok(())
    }

    fn apply_commands(&mut self, commands: Vec<Command>, now_ms: i64) -> Result<(), SimulationFault> {
        for command in commands {
            match command {
                Command::Fire { shooter, shell } => {
                    self.events.push(GameEvent::shell_fired(self.tick, shooter, shell.id, shell.target));
                    self.shells.push(shell);
                }
                Command::ShellArrived { shell_id, impact, trajectory } => {
                    self.shells.retain(|s| s.id != shell_id);
                    self.resolve_impact(impact, trajectory, now_ms)?;
                }
                Command::RemoveStatic { id } => {
                    self.craters.retain(|c| c.id != id);
                    self.events.push(GameEvent::crater_faded(self.tick, id));
                }
            }
        }
        Ok(())
    }

    /// Damage every unit under `impact`, or leave a crater if none.
    fn resolve_impact(&mut self, impact: Position, trajectory: Direction, now_ms: i64) -> Result<(), SimulationFault> {
        let hits = units_containing(&self.units, impact.vector())?;

        if hits.is_empty() {
            let crater = Crater::new(impact, now_ms, self.config.crater_lifetime_ms);
            trace!("Crater {} formed at {}", crater.id, impact);
            self.events.push(GameEvent::crater_formed(self.tick, crater.id, impact));
            self.craters.push(crater);
            return Ok(());
        }

        let mut destroyed = Vec::new();
        for index in hits {
            let unit = &mut self.units[index];
            let outcome = unit.register_hit(impact, trajectory, &self.config);
            self.events.push(GameEvent::unit_hit(self.tick, unit.id.clone(), impact, outcome));
            if outcome == HitOutcome::Destroyed {
                destroyed.push(unit.id.clone());
            }
        }
        for id in destroyed {
            self.destroy_unit(&id);
        }
        Ok(())
    }

    fn halt(&mut self, fault: SimulationFault) {
        error!("Game {} halted at tick {}: {}", self.game_id, self.tick, fault);
        self.halted = true;
        self.events.push(GameEvent::simulation_halted(self.tick, fault.to_string()));
        self.stop();
    }

    fn render(&self, now_ms: i64, canvas: &mut dyn Canvas) {
        let mut painter = Painter::new(canvas, &self.camera, now_ms);
        painter.clear(Color::GROUND);
        let view = painter.view();

        for obstacle in self.obstacles.iter().filter(|o| o.in_fov(&view)) {
            obstacle.render(&mut painter);
        }
        for crater in self.craters.iter().filter(|c| c.in_fov(&view)) {
            crater.render(&mut painter);
        }
        for shell in self.shells.iter().filter(|s| s.in_fov(&view)) {
            shell.render(&mut painter);
        }

        let mut drawn = 0;
        for unit in self.units.iter().filter(|u| u.in_fov(&view)) {
            unit.render(&mut painter);
            drawn += 1;
        }

        self.cursor.render(&mut painter);

        if let Some(outline) = self.pointer.select_box.and_then(|b| b.outline()) {
            painter.path(&outline, &Stroke::solid(Color::WHITE, 1.0).closed());
        }

        painter.reference_grid(self.config.grid_spacing);

        if self.tick % 600 == 0 {
            debug!("Frame {}: {} of {} units on screen", self.tick, drawn, self.units.len());
        }
    }
}
