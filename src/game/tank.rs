//! Unit Controller
//!
//! Each tick a tank picks one maneuver from its intent fields:
//!
//! ```text
//! move target farther than arrive radius  -> Moving      (steer toward it)
//! fire target farther than fire range     -> Approaching (steer toward it)
//! fire target in range, misaligned        -> Aligning    (turn in place)
//! fire target in range, aligned, loaded   -> Firing      (spawn a shell)
//! fire target in range, aligned, reloading-> Reloading   (hold)
//! otherwise                               -> Idle
//! ```
//!
//! Motion comes from two treads. Both forward drives straight, one forward
//! arcs while closing distance, opposite directions pivot in place.

use serde::{Serialize, Deserialize};
use tracing::debug;
#[cfg(feature = "debug-tracing")]
use tracing::trace;

use crate::config::SimulationConfig;
use crate::core::lines::{Construct, Ray, Segment};
use crate::core::shape::{OrientedRect, Outline};
use crate::core::vec2::{ConversionError, Direction, Position, Vector};
use crate::game::camera::ViewRect;
use crate::game::entity::{BareEntity, Command, Entity, EntityKind, Team, TickContext};
use crate::game::render::{Color, Painter, Stroke};
use crate::game::shell::Shell;
use crate::game::tick::SimulationFault;

// =============================================================================
// SILHOUETTE
// =============================================================================

const CHASSIS: Outline<4> = Outline::new([[15.0, 10.0], [15.0, -10.0], [-15.0, -10.0], [-15.0, 10.0]]);

const BARREL: Outline<4> = Outline::new([[25.0, 2.5], [25.0, -2.5], [0.0, -2.5], [0.0, 2.5]]);

const TURRET: Outline<10> = Outline::new([
    [8.0, -4.0],
    [2.5, -6.5],
    [-5.0, -6.5],
    [-7.0, -4.5],
    [-8.0, -2.5],
    [-8.0, 2.5],
    [-7.0, 4.5],
    [-5.0, 6.5],
    [2.5, 6.5],
    [8.0, 4.0],
]);

const FLAG: Outline<4> = Outline::new([[-1.0, 4.0], [-5.0, 4.0], [-5.0, -4.0], [-1.0, -4.0]]);

/// Culling margin around the unit center.
const FOV_MARGIN: f64 = 20.0;

/// Dash pattern for target guide lines.
const GUIDE_DASH: [f64; 2] = [2.0, 6.0];

// =============================================================================
// TREADS
// =============================================================================

/// State of one tread for a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tread {
    /// Driving forward
    Forward,
    /// Driving backward
    Back,
    /// Not driving
    Idle,
}

/// Both treads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treads {
    /// Left side
    pub left: Tread,
    /// Right side
    pub right: Tread,
}

impl Treads {
    /// No motion.
    pub const IDLE: Self = Self { left: Tread::Idle, right: Tread::Idle };
    /// Straight ahead.
    pub const FORWARD: Self = Self { left: Tread::Forward, right: Tread::Forward };
    /// Arc turning counter-clockwise.
    pub const ARC_LEFT: Self = Self { left: Tread::Idle, right: Tread::Forward };
    /// Arc turning clockwise.
    pub const ARC_RIGHT: Self = Self { left: Tread::Forward, right: Tread::Idle };
    /// Pivot counter-clockwise.
    pub const PIVOT_LEFT: Self = Self { left: Tread::Back, right: Tread::Forward };
    /// Pivot clockwise.
    pub const PIVOT_RIGHT: Self = Self { left: Tread::Forward, right: Tread::Back };
}

/// Treads for closing on a target `angle` degrees off the heading.
///
/// Returns the treads and whether the heading should snap onto the target.
pub fn steer(angle: f64, config: &SimulationConfig) -> (Treads, bool) {
    let magnitude = angle.abs();
    if magnitude <= config.arc_turn_limit {
        if magnitude <= config.snap_angle {
            (Treads::FORWARD, true)
        } else if angle < 0.0 {
            (Treads::ARC_LEFT, false)
        } else {
            (Treads::ARC_RIGHT, false)
        }
    } else {
        (pivot(angle), false)
    }
}

/// Treads for turning in place toward a target `angle` degrees off.
pub fn pivot(angle: f64) -> Treads {
    if angle < 0.0 {
        Treads::PIVOT_LEFT
    } else {
        Treads::PIVOT_RIGHT
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// What the unit did this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Maneuver {
    /// No intent
    Idle,
    /// Driving to the move target
    Moving,
    /// Closing to firing range
    Approaching,
    /// Turning onto the fire target
    Aligning,
    /// Fired a shell
    Firing,
    /// Aligned, waiting for reload
    Reloading,
}

/// A selection gesture in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Selection {
    /// Single click
    Point(Position),
    /// Drag box between two opposite corners
    Box(Position, Position),
}

/// Result of a registered hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// First off-center hit
    Damaged,
    /// Direct hit or second hit
    Destroyed,
}

// =============================================================================
// TANK
// =============================================================================

/// A unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Tank {
    /// Unit id
    pub id: String,
    /// Owner
    pub team: Team,
    /// Drive order
    pub move_target: Option<Position>,
    /// Attack order
    pub fire_target: Option<Position>,
    /// Selected by the local player
    pub selected: bool,
    pos: Position,
    dir: Direction,
    damaged: bool,
    cooldown_ms: i64,
    last_fire_ms: i64,
}

impl Tank {
    /// New idle unit.
    pub fn new(id: impl Into<String>, team: Team, pos: Position, dir: Direction, now_ms: i64) -> Self {
        Self {
            id: id.into(),
            team,
            move_target: None,
            fire_target: None,
            selected: false,
            pos,
            dir,
            damaged: false,
            cooldown_ms: 0,
            last_fire_ms: now_ms,
        }
    }

    /// Build from snapshot fields.
    pub fn from_snapshot(pos: [f64; 2], dir: [f64; 2], team: Team, id: &str, now_ms: i64) -> Self {
        Self::new(id, team, Position::from_raw(pos), Direction::from_raw(dir), now_ms)
    }

    /// Center.
    pub fn pos(&self) -> Position {
        self.pos
    }

    /// Heading.
    pub fn dir(&self) -> Direction {
        self.dir
    }

    /// True after one off-center hit.
    pub fn is_damaged(&self) -> bool {
        self.damaged
    }

    /// Remaining reload time.
    pub fn cooldown_ms(&self) -> i64 {
        self.cooldown_ms
    }

    // ----- orders -----

    /// Drive to `target`, dropping any attack order.
    pub fn order_move(&mut self, target: Position) {
        self.move_target = Some(target);
        self.fire_target = None;
    }

    /// Attack `target`, dropping any drive order.
    pub fn order_attack(&mut self, target: Position) {
        self.fire_target = Some(target);
        self.move_target = None;
    }

    // ----- geometry -----

    /// Chassis corners in world space.
    pub fn chassis(&self) -> [Position; 4] {
        CHASSIS.place(self.pos, self.dir)
    }

    fn chassis_rect(&self) -> OrientedRect {
        let [a, b, _, d] = self.chassis();
        OrientedRect::new(a, b, d)
    }

    /// True if the point is strictly inside the chassis.
    ///
    /// Fails if `m` is a direction rather than a location.
    pub fn point_inside(&self, m: Vector) -> Result<bool, ConversionError> {
        let point = m.as_position()?;
        Ok(self.chassis_rect().contains(point))
    }

    /// Click selects by chassis silhouette; box selects by center.
    pub fn selected_by(&self, selection: &Selection) -> bool {
        match *selection {
            Selection::Point(p) => self.chassis_rect().contains(p),
            Selection::Box(p, q) => OrientedRect::from_corners(p, q).contains(self.pos),
        }
    }

    /// True if the ray crosses any chassis edge.
    pub fn hit_by(&self, ray: &Ray) -> bool {
        let [a, b, c, d] = self.chassis();
        [(a, b), (b, c), (c, d), (d, a)]
            .into_iter()
            .any(|(p, q)| ray.intersection(&Construct::Segment(Segment::new(p, q))).is_some())
    }

    /// Apply a shell impact.
    pub fn register_hit(&mut self, impact: Position, trajectory: Direction, config: &SimulationConfig) -> HitOutcome {
        let distance = impact.distance_to(self.pos);
        let outcome = if distance < config.direct_hit_radius || self.damaged {
            HitOutcome::Destroyed
        } else {
            self.damaged = true;
            HitOutcome::Damaged
        };
        debug!(
            "Unit {} hit {:.2} from center, trajectory {}: {:?}",
            self.id, distance, trajectory, outcome
        );
        outcome
    }

    // ----- per-tick -----

    /// Run one tick of the state machine.
    pub fn step(&mut self, ctx: &mut TickContext<'_>) -> Result<Maneuver, SimulationFault> {
        let config = ctx.config;

        let maneuver = match self.move_target {
            Some(target) if self.pos.distance_to(target) > config.arrive_radius => {
                self.close_on(target, config);
                Maneuver::Moving
            }
            _ => {
                self.move_target = None;
                match self.fire_target {
                    None => Maneuver::Idle,
                    Some(target) if self.pos.distance_to(target) > config.fire_range => {
                        self.close_on(target, config);
                        Maneuver::Approaching
                    }
                    Some(target) => self.engage(target, ctx),
                }
            }
        };

        self.reload(ctx.now_ms, ctx.config);

        #[cfg(feature = "debug-tracing")]
        trace!("Unit {} {:?} at {} facing {}", self.id, maneuver, self.pos, self.dir);

        if !self.pos.is_finite() || !self.dir.is_finite() {
            return Err(SimulationFault::NonFinite { entity: EntityKind::Tank, id: self.id.clone() });
        }
        Ok(maneuver)
    }

    fn close_on(&mut self, target: Position, config: &SimulationConfig) {
        let to_target = self.pos.vector_to(target);
        let (treads, snap) = steer(self.dir.angle_between(to_target), config);
        if snap {
            self.dir = to_target.normalize();
        }
        self.drive(treads, config);
    }

    fn engage(&mut self, target: Position, ctx: &mut TickContext<'_>) -> Maneuver {
        let config = ctx.config;
        let to_target = self.pos.vector_to(target);
        let angle = self.dir.angle_between(to_target);
        let magnitude = angle.abs();

        if magnitude <= config.fire_alignment {
            if self.cooldown_ms == 0 {
                self.fire(target, ctx);
                Maneuver::Firing
            } else {
                Maneuver::Reloading
            }
        } else if magnitude <= config.snap_angle {
            self.dir = to_target.normalize();
            Maneuver::Aligning
        } else {
            self.drive(pivot(angle), config);
            Maneuver::Aligning
        }
    }

    fn fire(&mut self, target: Position, ctx: &mut TickContext<'_>) {
        self.last_fire_ms = ctx.now_ms;
        self.cooldown_ms = ctx.config.reload_ms;

        let shell = Shell::new(self.pos, self.dir, target, ctx.config.muzzle_velocity);
        debug!("Unit {} fired shell {} at {}", self.id, shell.id, target);
        ctx.push(Command::Fire { shooter: self.id.clone(), shell });
    }

    fn reload(&mut self, now_ms: i64, config: &SimulationConfig) {
        if self.cooldown_ms != 0 {
            self.cooldown_ms = (config.reload_ms - (now_ms - self.last_fire_ms)).max(0);
        }
    }

    /// Apply one tick of tread motion.
    pub fn drive(&mut self, treads: Treads, config: &SimulationConfig) {
        let speed = config.tank_speed;
        let turn = config.rotate_speed;

        match (treads.left, treads.right) {
            (Tread::Forward, Tread::Forward) => {
                self.pos = self.pos + self.dir.scale(speed);
            }
            (Tread::Forward, Tread::Idle) => {
                self.dir = self.dir.rotate_by(turn / 2.0);
                self.pos = self.pos + self.dir.scale(speed);
            }
            (Tread::Idle, Tread::Forward) => {
                self.dir = self.dir.rotate_by(-turn / 2.0);
                self.pos = self.pos + self.dir.scale(speed);
            }
            (Tread::Forward, Tread::Back) => {
                self.dir = self.dir.rotate_by(turn);
            }
            (Tread::Back, Tread::Forward) => {
                self.dir = self.dir.rotate_by(-turn);
            }
            (Tread::Back, Tread::Back) => {
                self.pos = self.pos - self.dir.scale(speed);
            }
            _ => {}
        }
    }
}

impl Entity for Tank {
    fn kind(&self) -> EntityKind {
        EntityKind::Tank
    }

    fn snapshot(&self) -> BareEntity {
        BareEntity::Tank {
            pos: self.pos.raw(),
            dir: self.dir.raw(),
            team: self.team,
            id: self.id.clone(),
        }
    }

    fn in_fov(&self, view: &ViewRect) -> bool {
        view.contains(self.pos, FOV_MARGIN)
    }

    fn render(&self, painter: &mut Painter<'_>) {
        if self.selected {
            if let Some(target) = self.fire_target {
                painter.path(&[target, self.pos], &Stroke::dashed(Color::RED, 1.5, &GUIDE_DASH));
            }
            if let Some(target) = self.move_target {
                painter.path(&[target, self.pos], &Stroke::dashed(Color::WHITE, 1.5, &GUIDE_DASH));
            }
        }

        let chassis = self.chassis();
        painter.polygon(&chassis, Color::CHASSIS);
        if self.selected {
            painter.path(&chassis, &Stroke::solid(Color::WHITE, 1.0).closed());
        }
        painter.polygon(&BARREL.place(self.pos, self.dir), Color::BARREL);
        painter.polygon(&TURRET.place(self.pos, self.dir), Color::TURRET);
        painter.polygon(&FLAG.place(self.pos, self.dir), self.team.color());
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<(), SimulationFault> {
        self.step(ctx).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::deg_to_rad;

    const EPS: f64 = 1e-9;

    fn tank_at(x: f64, y: f64, dir: Direction) -> Tank {
        Tank::new("t1", Team::Blue, Position::new(x, y), dir, 0)
    }

    fn step(tank: &mut Tank, now_ms: i64, config: &SimulationConfig) -> (Maneuver, Vec<Command>) {
        let mut ctx = TickContext::new(now_ms, config);
        let maneuver = tank.step(&mut ctx).unwrap();
        (maneuver, ctx.take_commands())
    }

    #[test]
    fn test_steer_bands() {
        let config = SimulationConfig::default();
        assert_eq!(steer(2.0, &config), (Treads::FORWARD, true));
        assert_eq!(steer(-10.0, &config), (Treads::ARC_LEFT, false));
        assert_eq!(steer(10.0, &config), (Treads::ARC_RIGHT, false));
        assert_eq!(steer(-90.0, &config), (Treads::PIVOT_LEFT, false));
        assert_eq!(steer(120.0, &config), (Treads::PIVOT_RIGHT, false));
    }

    #[test]
    fn test_idle_without_orders() {
        let config = SimulationConfig::default();
        let mut tank = tank_at(0.0, 0.0, Direction::RIGHT);
        let (maneuver, commands) = step(&mut tank, 16, &config);
        assert_eq!(maneuver, Maneuver::Idle);
        assert!(commands.is_empty());
        assert_eq!(tank.pos(), Position::ORIGIN);
    }

    #[test]
    fn test_drives_straight_at_aligned_target() {
        let config = SimulationConfig::default();
        let mut tank = tank_at(0.0, 0.0, Direction::RIGHT);
        tank.order_move(Position::new(100.0, 0.0));

        let (maneuver, _) = step(&mut tank, 16, &config);
        assert_eq!(maneuver, Maneuver::Moving);
        assert!((tank.pos().x - 2.0).abs() < EPS);
        assert!(tank.pos().y.abs() < EPS);
    }

    #[test]
    fn test_arc_turn_toward_left_target() {
        let config = SimulationConfig::default();
        let mut tank = tank_at(0.0, 0.0, Direction::RIGHT);
        let theta = deg_to_rad(10.0);
        tank.order_move(Position::new(100.0 * theta.cos(), 100.0 * theta.sin()));

        step(&mut tank, 16, &config);

        // Half a rotate step counter-clockwise, then forward
        assert!((tank.dir().reflex_angle() - 1.0).abs() < 1e-6);
        assert!((tank.pos().distance_to(Position::ORIGIN) - 2.0).abs() < 1e-9);
        assert!(tank.pos().y > 0.0);
    }

    #[test]
    fn test_pivot_when_target_behind() {
        let config = SimulationConfig::default();
        let mut tank = tank_at(0.0, 0.0, Direction::RIGHT);
        tank.order_move(Position::new(-100.0, 1.0));

        step(&mut tank, 16, &config);

        assert_eq!(tank.pos(), Position::ORIGIN);
        assert!((tank.dir().reflex_angle() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_move_order_clears_on_arrival() {
        let config = SimulationConfig::default();
        let mut tank = tank_at(0.0, 0.0, Direction::RIGHT);
        tank.order_move(Position::new(10.0, 0.0));

        let (maneuver, _) = step(&mut tank, 16, &config);
        assert_eq!(maneuver, Maneuver::Idle);
        assert_eq!(tank.move_target, None);
        assert_eq!(tank.pos(), Position::ORIGIN);
    }

    #[test]
    fn test_reaches_move_target() {
        let config = SimulationConfig::default();
        let mut tank = tank_at(0.0, 0.0, Direction::UP);
        tank.order_move(Position::new(200.0, 150.0));

        for frame in 0..1_000 {
            step(&mut tank, frame * 16, &config);
            if tank.move_target.is_none() {
                break;
            }
        }
        assert_eq!(tank.move_target, None);
        assert!(tank.pos().distance_to(Position::new(200.0, 150.0)) <= config.arrive_radius);
    }

    #[test]
    fn test_approaches_out_of_range_target() {
        let config = SimulationConfig::default();
        let mut tank = tank_at(0.0, 0.0, Direction::RIGHT);
        tank.order_attack(Position::new(1_000.0, 0.0));

        let (maneuver, commands) = step(&mut tank, 16, &config);
        assert_eq!(maneuver, Maneuver::Approaching);
        assert!(commands.is_empty());
        assert!((tank.pos().x - 2.0).abs() < EPS);
    }

    #[test]
    fn test_aligns_in_place_within_range() {
        let config = SimulationConfig::default();
        let mut tank = tank_at(0.0, 0.0, Direction::RIGHT);
        tank.order_attack(Position::new(0.0, 100.0));

        let (maneuver, commands) = step(&mut tank, 16, &config);
        assert_eq!(maneuver, Maneuver::Aligning);
        assert!(commands.is_empty());
        assert_eq!(tank.pos(), Position::ORIGIN);
        assert!((tank.dir().reflex_angle() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_fires_then_reloads() {
        let config = SimulationConfig::default();
        let mut tank = tank_at(0.0, 0.0, Direction::RIGHT);
        let target = Position::new(100.0, 0.0);
        tank.order_attack(target);

        let (maneuver, commands) = step(&mut tank, 1_000, &config);
        assert_eq!(maneuver, Maneuver::Firing);
        assert_eq!(tank.cooldown_ms(), config.reload_ms);
        match commands.as_slice() {
            [Command::Fire { shooter, shell }] => {
                assert_eq!(shooter, "t1");
                assert_eq!(shell.target, target);
                assert_eq!(shell.pos, Position::ORIGIN);
                assert_eq!(shell.velocity, config.muzzle_velocity);
            }
            other => panic!("unexpected commands {other:?}"),
        }

        let (maneuver, commands) = step(&mut tank, 2_000, &config);
        assert_eq!(maneuver, Maneuver::Reloading);
        assert!(commands.is_empty());
        assert_eq!(tank.cooldown_ms(), 6_500);

        // Cooldown floors at zero once the reload time has passed
        step(&mut tank, 9_000, &config);
        assert_eq!(tank.cooldown_ms(), 0);

        let (maneuver, commands) = step(&mut tank, 9_016, &config);
        assert_eq!(maneuver, Maneuver::Firing);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn test_orders_are_exclusive() {
        let mut tank = tank_at(0.0, 0.0, Direction::RIGHT);
        tank.order_move(Position::new(1.0, 1.0));
        tank.order_attack(Position::new(2.0, 2.0));
        assert_eq!(tank.move_target, None);
        assert_eq!(tank.fire_target, Some(Position::new(2.0, 2.0)));

        tank.order_move(Position::new(3.0, 3.0));
        assert_eq!(tank.fire_target, None);
    }

    #[test]
    fn test_direct_hit_destroys() {
        let config = SimulationConfig::default();
        let mut tank = tank_at(50.0, 50.0, Direction::RIGHT);
        let outcome = tank.register_hit(Position::new(52.0, 51.0), Direction::UP, &config);
        assert_eq!(outcome, HitOutcome::Destroyed);
    }

    #[test]
    fn test_second_hit_destroys() {
        let config = SimulationConfig::default();
        let mut tank = tank_at(50.0, 50.0, Direction::RIGHT);

        let first = tank.register_hit(Position::new(60.0, 55.0), Direction::UP, &config);
        assert_eq!(first, HitOutcome::Damaged);
        assert!(tank.is_damaged());

        let second = tank.register_hit(Position::new(40.0, 45.0), Direction::UP, &config);
        assert_eq!(second, HitOutcome::Destroyed);
    }

    #[test]
    fn test_point_inside_rotated_chassis() {
        let tank = tank_at(100.0, 100.0, Direction::UP);
        // Facing up: 20 wide, 30 long
        assert!(tank.point_inside(Position::new(100.0, 112.0).vector()).unwrap());
        assert!(!tank.point_inside(Position::new(112.0, 100.0).vector()).unwrap());
    }

    #[test]
    fn test_point_inside_rejects_direction() {
        let tank = tank_at(0.0, 0.0, Direction::RIGHT);
        let err = tank.point_inside(Direction::UP.vector()).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidConversion { .. }));
    }

    #[test]
    fn test_selected_by_box_any_drag_direction() {
        let tank = tank_at(50.0, 50.0, Direction::RIGHT);
        let forward = Selection::Box(Position::new(0.0, 0.0), Position::new(100.0, 100.0));
        let backward = Selection::Box(Position::new(100.0, 0.0), Position::new(0.0, 100.0));
        let miss = Selection::Box(Position::new(60.0, 60.0), Position::new(100.0, 100.0));

        assert!(tank.selected_by(&forward));
        assert!(tank.selected_by(&backward));
        assert!(!tank.selected_by(&miss));
    }

    #[test]
    fn test_selected_by_click_on_chassis() {
        let tank = tank_at(50.0, 50.0, Direction::RIGHT);
        assert!(tank.selected_by(&Selection::Point(Position::new(60.0, 55.0))));
        assert!(!tank.selected_by(&Selection::Point(Position::new(70.0, 50.0))));
    }

    #[test]
    fn test_hit_by_ray() {
        let tank = tank_at(100.0, 0.0, Direction::RIGHT);
        let toward = Ray::new(Position::new(0.0, 1.0), Direction::RIGHT);
        let away = Ray::new(Position::new(0.0, 1.0), Direction::new(-1.0, 0.0));
        let above = Ray::new(Position::new(0.0, 50.0), Direction::RIGHT);

        assert!(tank.hit_by(&toward));
        assert!(!tank.hit_by(&away));
        assert!(!tank.hit_by(&above));
    }

    #[test]
    fn test_snapshot_roundtrip_fields() {
        let tank = Tank::from_snapshot([1.0, 2.0], [0.0, 1.0], Team::Red, "abc", 0);
        assert_eq!(
            tank.snapshot(),
            BareEntity::Tank { pos: [1.0, 2.0], dir: [0.0, 1.0], team: Team::Red, id: "abc".to_string() }
        );
    }
}
