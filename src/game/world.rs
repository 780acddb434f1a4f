//! World Entities
//!
//! Obstacles ([`Wall`], [`Tree`]) are immutable for the whole session.
//! A [`Crater`] marks a missed shot and removes itself after a fixed lifetime.
//! The [`Cursor`] lives in canvas space and follows the pointer.

use serde::{Serialize, Deserialize};
use tracing::trace;
use uuid::Uuid;

use crate::core::lines::Segment;
use crate::core::vec2::Position;
use crate::game::camera::{ScreenPoint, ViewRect};
use crate::game::entity::{BareEntity, Command, Entity, EntityKind, TickContext};
use crate::game::render::{Color, Fill, GradientStop, Painter, Stroke};
use crate::game::tick::SimulationFault;

// =============================================================================
// OBSTACLES
// =============================================================================

/// Wall line width in pixels.
const WALL_WIDTH: f64 = 6.0;

/// Tree radius in world units.
pub const TREE_RADIUS: f64 = 14.0;

/// Immutable wall segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wall {
    /// First endpoint
    pub start: Position,
    /// Second endpoint
    pub end: Position,
}

impl Wall {
    /// Create a wall.
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// The wall as a segment.
    pub fn as_segment(&self) -> Segment {
        Segment::new(self.start, self.end)
    }
}

impl Entity for Wall {
    fn kind(&self) -> EntityKind {
        EntityKind::Wall
    }

    fn snapshot(&self) -> BareEntity {
        BareEntity::Wall { start: self.start.raw(), end: self.end.raw() }
    }

    fn in_fov(&self, view: &ViewRect) -> bool {
        view.contains(self.start, 0.0) || view.contains(self.end, 0.0)
    }

    fn render(&self, painter: &mut Painter<'_>) {
        painter.path(&[self.start, self.end], &Stroke::solid(Color::WALL, WALL_WIDTH));
    }
}

/// Round cosmetic obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tree {
    /// Center
    pub pos: Position,
    /// Radius in world units
    pub radius: f64,
}

impl Tree {
    /// Tree of the standard radius.
    pub const fn new(pos: Position) -> Self {
        Self { pos, radius: TREE_RADIUS }
    }
}

impl Entity for Tree {
    fn kind(&self) -> EntityKind {
        EntityKind::Tree
    }

    fn snapshot(&self) -> BareEntity {
        BareEntity::Tree { pos: self.pos.raw() }
    }

    fn in_fov(&self, view: &ViewRect) -> bool {
        view.contains(self.pos, self.radius / 2.0)
    }

    fn render(&self, painter: &mut Painter<'_>) {
        painter.circle(self.pos, self.radius, &Fill::Solid(Color::TREE));
    }
}

/// Any static obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Obstacle {
    /// Wall segment
    Wall(Wall),
    /// Tree
    Tree(Tree),
}

impl Obstacle {
    /// Build from a snapshot; `None` for non-obstacle kinds.
    pub fn from_snapshot(bare: &BareEntity) -> Option<Self> {
        match *bare {
            BareEntity::Wall { start, end } => {
                Some(Obstacle::Wall(Wall::new(Position::from_raw(start), Position::from_raw(end))))
            }
            BareEntity::Tree { pos } => Some(Obstacle::Tree(Tree::new(Position::from_raw(pos)))),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Entity {
        match self {
            Obstacle::Wall(w) => w as &dyn Entity,
            Obstacle::Tree(t) => t as &dyn Entity,
        }
    }
}

impl Entity for Obstacle {
    fn kind(&self) -> EntityKind {
        self.inner().kind()
    }

    fn snapshot(&self) -> BareEntity {
        self.inner().snapshot()
    }

    fn in_fov(&self, view: &ViewRect) -> bool {
        self.inner().in_fov(view)
    }

    fn render(&self, painter: &mut Painter<'_>) {
        self.inner().render(painter)
    }
}

// =============================================================================
// CRATER
// =============================================================================

/// Culling margin around a crater.
const CRATER_FOV_MARGIN: f64 = 5.0;

/// Crater disc radius in world units.
const CRATER_RADIUS: f64 = 8.0;

/// Gradient radius in world units.
const CRATER_GRADIENT_RADIUS: f64 = 16.0;

/// Impact mark left by a shell that hit nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct Crater {
    /// Unique id
    pub id: Uuid,
    /// Center
    pub pos: Position,
    /// Creation time, ms since epoch
    pub created_at: i64,
    /// Lifetime, ms
    pub lifetime_ms: i64,
    expired: bool,
}

impl Crater {
    /// New crater.
    pub fn new(pos: Position, created_at: i64, lifetime_ms: i64) -> Self {
        Self { id: Uuid::new_v4(), pos, created_at, lifetime_ms, expired: false }
    }

    /// Age at `now_ms`.
    pub fn age(&self, now_ms: i64) -> i64 {
        (now_ms - self.created_at).max(0)
    }

    /// `1 - age^4 / lifetime^4`, clamped to [0, 1].
    pub fn opacity(&self, now_ms: i64) -> f64 {
        if self.lifetime_ms <= 0 {
            return 0.0;
        }
        let t = self.age(now_ms) as f64 / self.lifetime_ms as f64;
        (1.0 - t.powi(4)).clamp(0.0, 1.0)
    }

    /// True once the lifetime has elapsed.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.age(now_ms) >= self.lifetime_ms
    }
}

impl Entity for Crater {
    fn kind(&self) -> EntityKind {
        EntityKind::Crater
    }

    fn snapshot(&self) -> BareEntity {
        BareEntity::Crater { pos: self.pos.raw(), created_at: self.created_at }
    }

    fn in_fov(&self, view: &ViewRect) -> bool {
        view.contains(self.pos, CRATER_FOV_MARGIN)
    }

    fn render(&self, painter: &mut Painter<'_>) {
        let alpha = self.opacity(painter.now_ms());
        let fill = Fill::Radial {
            radius: painter.camera().to_pixels(CRATER_GRADIENT_RADIUS),
            stops: vec![
                GradientStop { offset: 0.0, color: Color::Rgba(36, 18, 2, alpha) },
                GradientStop { offset: 0.25, color: Color::Rgba(73, 38, 13, alpha) },
                GradientStop { offset: 1.0, color: Color::Rgba(210, 86, 78, alpha) },
            ],
        };
        painter.circle(self.pos, CRATER_RADIUS, &fill);
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<(), SimulationFault> {
        if !self.expired && self.is_expired(ctx.now_ms) {
            self.expired = true;
            trace!("Crater {} faded", self.id);
            ctx.push(Command::RemoveStatic { id: self.id });
        }
        Ok(())
    }
}

// =============================================================================
// CURSOR
// =============================================================================

/// Cursor appearance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorType {
    /// Nothing selected
    #[default]
    Default,
    /// Units selected, orders will move
    Move,
    /// Units selected, orders will attack
    Attack,
}

const DIAMOND: [[f64; 2]; 4] = [[0.0, 7.0], [-7.0, 0.0], [0.0, -7.0], [7.0, 0.0]];

const ARROW: [[f64; 2]; 7] = [
    [0.0, 0.0],
    [9.0, 0.0],
    [5.0, -3.0],
    [9.0, -7.0],
    [7.0, -9.0],
    [3.0, -5.0],
    [0.0, -9.0],
];

/// Pointer drawn in canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cursor {
    /// Canvas position
    pub pos: ScreenPoint,
    /// Appearance
    pub cursor_type: CursorType,
}

impl Cursor {
    fn shape<const N: usize>(&self, template: &[[f64; 2]; N]) -> Vec<ScreenPoint> {
        template.iter().map(|[x, y]| self.pos.offset(*x, *y)).collect()
    }
}

impl Entity for Cursor {
    fn kind(&self) -> EntityKind {
        EntityKind::Cursor
    }

    fn snapshot(&self) -> BareEntity {
        BareEntity::Cursor { pos: [self.pos.x, self.pos.y] }
    }

    fn in_fov(&self, _view: &ViewRect) -> bool {
        true
    }

    fn render(&self, painter: &mut Painter<'_>) {
        match self.cursor_type {
            CursorType::Default => {
                painter.screen_polygon(&self.shape(&ARROW), Color::BLACK);
            }
            CursorType::Move => {
                painter.screen_path(&self.shape(&DIAMOND), &Stroke::solid(Color::GREEN, 3.0).closed());
            }
            CursorType::Attack => {
                painter.screen_path(&self.shape(&DIAMOND), &Stroke::solid(Color::RED, 3.0).closed());
                let cross = Stroke::solid(Color::RED, 2.0);
                painter.screen_path(&self.shape(&[[-6.0, 0.0], [6.0, 0.0]]), &cross);
                painter.screen_path(&self.shape(&[[0.0, 6.0], [0.0, -6.0]]), &cross);
            }
        }
    }
}
