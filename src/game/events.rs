//! Game Events
//!
//! Events generated while a frame runs, returned to the caller in
//! [`TickResult`](crate::game::tick::TickResult) for logging and tests.

use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::core::vec2::Position;
use crate::game::tank::HitOutcome;
use crate::network::protocol::OrderKind;

/// Priority for event ordering within a tick.
///
/// Lower value = reported first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Fail-stop
    Halt = 0,
    /// Unit removal
    Destruction = 1,
    /// Impacts
    Impact = 2,
    /// Orders applied between frames
    Order = 3,
    /// New projectiles
    Fire = 4,
    /// Cosmetic changes
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// An order reached its units
    OrderApplied {
        kind: OrderKind,
        unit_ids: Vec<String>,
        target: Position,
    },

    /// A unit fired
    ShellFired {
        unit_id: String,
        shell_id: Uuid,
        target: Position,
    },

    /// A shell landed inside a unit
    UnitHit {
        unit_id: String,
        impact: Position,
        outcome: HitOutcome,
    },

    /// A unit was removed
    UnitDestroyed {
        unit_id: String,
    },

    /// A shell landed on open ground
    CraterFormed {
        crater_id: Uuid,
        pos: Position,
    },

    /// A crater reached the end of its lifetime
    CraterFaded {
        crater_id: Uuid,
    },

    /// The frame failed and the simulation stopped
    SimulationHalted {
        reason: String,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Ordering priority
    pub priority: EventPriority,

    /// Unit involved (for tie-breaking)
    pub unit_id: Option<String>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u64, priority: EventPriority, data: GameEventData) -> Self {
        let unit_id = match &data {
            GameEventData::ShellFired { unit_id, .. } => Some(unit_id.clone()),
            GameEventData::UnitHit { unit_id, .. } => Some(unit_id.clone()),
            GameEventData::UnitDestroyed { unit_id } => Some(unit_id.clone()),
            _ => None,
        };

        Self { tick, priority, unit_id, data }
    }

    /// Order applied event.
    pub fn order_applied(tick: u64, kind: OrderKind, unit_ids: Vec<String>, target: Position) -> Self {
        Self::new(tick, EventPriority::Order, GameEventData::OrderApplied { kind, unit_ids, target })
    }

    /// Shell fired event.
    pub fn shell_fired(tick: u64, unit_id: String, shell_id: Uuid, target: Position) -> Self {
        Self::new(tick, EventPriority::Fire, GameEventData::ShellFired { unit_id, shell_id, target })
    }

    /// Unit hit event.
    pub fn unit_hit(tick: u64, unit_id: String, impact: Position, outcome: HitOutcome) -> Self {
        Self::new(tick, EventPriority::Impact, GameEventData::UnitHit { unit_id, impact, outcome })
    }

    /// Unit destroyed event.
    pub fn unit_destroyed(tick: u64, unit_id: String) -> Self {
        Self::new(tick, EventPriority::Destruction, GameEventData::UnitDestroyed { unit_id })
    }

    /// Crater formed event.
    pub fn crater_formed(tick: u64, crater_id: Uuid, pos: Position) -> Self {
        Self::new(tick, EventPriority::Impact, GameEventData::CraterFormed { crater_id, pos })
    }

    /// Crater faded event.
    pub fn crater_faded(tick: u64, crater_id: Uuid) -> Self {
        Self::new(tick, EventPriority::Other, GameEventData::CraterFaded { crater_id })
    }

    /// Simulation halted event.
    pub fn simulation_halted(tick: u64, reason: String) -> Self {
        Self::new(tick, EventPriority::Halt, GameEventData::SimulationHalted { reason })
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.tick == other.tick
            && self.priority == other.priority
            && self.unit_id == other.unit_id
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: tick, then priority, then unit id
        self.tick
            .cmp(&other.tick)
            .then(self.priority.cmp(&other.priority))
            .then(self.unit_id.cmp(&other.unit_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let destroyed = GameEvent::unit_destroyed(10, "a".into());
        let hit = GameEvent::unit_hit(10, "a".into(), Position::ORIGIN, HitOutcome::Destroyed);
        let other_destroyed = GameEvent::unit_destroyed(10, "b".into());
        let earlier = GameEvent::crater_faded(9, Uuid::nil());

        // Same tick, destruction before impact
        assert!(destroyed < hit);

        // Same tick and priority, ordered by unit id
        assert!(destroyed < other_destroyed);

        // Tick dominates priority
        assert!(earlier < destroyed);
    }

    #[test]
    fn test_unit_id_extracted() {
        let fired = GameEvent::shell_fired(1, "u7".into(), Uuid::nil(), Position::ORIGIN);
        assert_eq!(fired.unit_id.as_deref(), Some("u7"));

        let halted = GameEvent::simulation_halted(1, "boom".into());
        assert_eq!(halted.unit_id, None);
    }
}
