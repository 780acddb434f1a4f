//! Render Pass Plumbing
//!
//! The kernel never rasterizes. It issues paint calls against a [`Canvas`],
//! which the host implements over whatever surface it owns. [`DrawList`]
//! is a canvas that records calls, used by the headless binary and tests.
//!
//! All canvas coordinates are y-up from the bottom-left corner.

use serde::Serialize;

use crate::core::vec2::Position;
use crate::game::camera::{Camera, ScreenPoint, ViewRect};

// =============================================================================
// PAINT PRIMITIVES
// =============================================================================

/// Paint color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Color {
    /// CSS-style named or hex color
    Css(&'static str),
    /// RGB with alpha in [0, 1]
    Rgba(u8, u8, u8, f64),
}

impl Color {
    /// Terrain background.
    pub const GROUND: Color = Color::Css("#c2864e");
    /// Tank chassis.
    pub const CHASSIS: Color = Color::Css("#186606");
    /// Tank barrel.
    pub const BARREL: Color = Color::Css("#0e4002");
    /// Tank turret.
    pub const TURRET: Color = Color::Css("#1c8503");
    /// Walls.
    pub const WALL: Color = Color::Css("#424541");
    /// Tree trunks.
    pub const TREE: Color = Color::Css("#422007");
    /// Shells.
    pub const SHELL: Color = Color::Css("black");
    /// Overlays and grid.
    pub const WHITE: Color = Color::Css("white");
    /// Attack overlays.
    pub const RED: Color = Color::Css("red");
    /// Move cursor.
    pub const GREEN: Color = Color::Css("green");
    /// Default cursor.
    pub const BLACK: Color = Color::Css("black");
}

/// Line style.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stroke {
    /// Line color
    pub color: Color,
    /// Line width in pixels
    pub width: f64,
    /// Dash pattern (empty for solid)
    pub dash: Vec<f64>,
    /// Close the path back to the first point
    pub closed: bool,
}

impl Stroke {
    /// Solid open line.
    pub fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dash: Vec::new(), closed: false }
    }

    /// Dashed open line.
    pub fn dashed(color: Color, width: f64, dash: &[f64]) -> Self {
        Self { color, width, dash: dash.to_vec(), closed: false }
    }

    /// Close the path.
    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }
}

/// One stop of a radial gradient.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GradientStop {
    /// Position along the radius in [0, 1]
    pub offset: f64,
    /// Color at this stop
    pub color: Color,
}

/// Circle fill.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Fill {
    /// Single color
    Solid(Color),
    /// Radial gradient out to `radius` pixels
    Radial {
        /// Gradient radius in pixels
        radius: f64,
        /// Color stops
        stops: Vec<GradientStop>,
    },
}

/// Drawing surface supplied by the host.
pub trait Canvas {
    /// Fill the whole surface.
    fn clear(&mut self, color: Color);

    /// Fill a polygon.
    fn fill_polygon(&mut self, points: &[ScreenPoint], color: Color);

    /// Stroke a polyline.
    fn stroke_path(&mut self, points: &[ScreenPoint], stroke: &Stroke);

    /// Fill a circle.
    fn fill_circle(&mut self, center: ScreenPoint, radius: f64, fill: &Fill);
}

// =============================================================================
// DRAW LIST
// =============================================================================

/// A recorded canvas call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DrawCommand {
    /// `Canvas::clear`
    Clear(Color),
    /// `Canvas::fill_polygon`
    Polygon {
        /// Vertices
        points: Vec<ScreenPoint>,
        /// Fill color
        color: Color,
    },
    /// `Canvas::stroke_path`
    Path {
        /// Vertices
        points: Vec<ScreenPoint>,
        /// Line style
        stroke: Stroke,
    },
    /// `Canvas::fill_circle`
    Circle {
        /// Center
        center: ScreenPoint,
        /// Radius in pixels
        radius: f64,
        /// Fill
        fill: Fill,
    },
}

/// Canvas that records every call.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded calls in order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of recorded calls.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True if nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all recorded calls.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Count polygons filled with `color`.
    pub fn count_polygons(&self, color: Color) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polygon { color: fill, .. } if *fill == color))
            .count()
    }

    /// Count paths stroked with `color`.
    pub fn count_paths(&self, color: Color) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Path { stroke, .. } if stroke.color == color))
            .count()
    }
}

impl Canvas for DrawList {
    fn clear(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_polygon(&mut self, points: &[ScreenPoint], color: Color) {
        self.commands.push(DrawCommand::Polygon { points: points.to_vec(), color });
    }

    fn stroke_path(&mut self, points: &[ScreenPoint], stroke: &Stroke) {
        self.commands.push(DrawCommand::Path { points: points.to_vec(), stroke: stroke.clone() });
    }

    fn fill_circle(&mut self, center: ScreenPoint, radius: f64, fill: &Fill) {
        self.commands.push(DrawCommand::Circle { center, radius, fill: fill.clone() });
    }
}

// =============================================================================
// PAINTER
// =============================================================================

/// A canvas paired with the camera, so entities can paint in world space.
pub struct Painter<'a> {
    canvas: &'a mut dyn Canvas,
    camera: &'a Camera,
    now_ms: i64,
}

impl<'a> Painter<'a> {
    /// Wrap a canvas for one frame.
    pub fn new(canvas: &'a mut dyn Canvas, camera: &'a Camera, now_ms: i64) -> Self {
        Self { canvas, camera, now_ms }
    }

    /// Camera for this frame.
    pub fn camera(&self) -> &Camera {
        self.camera
    }

    /// Frame timestamp.
    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    /// World rectangle currently visible.
    pub fn view(&self) -> ViewRect {
        self.camera.visible()
    }

    /// Fill the canvas.
    pub fn clear(&mut self, color: Color) {
        self.canvas.clear(color);
    }

    /// Fill a world-space polygon.
    pub fn polygon(&mut self, points: &[Position], color: Color) {
        let screen: Vec<ScreenPoint> = points.iter().map(|p| self.camera.world_to_screen(*p)).collect();
        self.canvas.fill_polygon(&screen, color);
    }

    /// Stroke a world-space path.
    pub fn path(&mut self, points: &[Position], stroke: &Stroke) {
        let screen: Vec<ScreenPoint> = points.iter().map(|p| self.camera.world_to_screen(*p)).collect();
        self.canvas.stroke_path(&screen, stroke);
    }

    /// Fill a world-space circle; `radius` is in world units.
    pub fn circle(&mut self, center: Position, radius: f64, fill: &Fill) {
        let c = self.camera.world_to_screen(center);
        let r = self.camera.to_pixels(radius);
        self.canvas.fill_circle(c, r, fill);
    }

    /// Fill a canvas-space polygon.
    pub fn screen_polygon(&mut self, points: &[ScreenPoint], color: Color) {
        self.canvas.fill_polygon(points, color);
    }

    /// Stroke a canvas-space path.
    pub fn screen_path(&mut self, points: &[ScreenPoint], stroke: &Stroke) {
        self.canvas.stroke_path(points, stroke);
    }

    /// Axes along the left and bottom edges with notches every `spacing`
    /// pixels out from the canvas center.
    pub fn reference_grid(&mut self, spacing: f64) {
        let w = self.camera.width;
        let h = self.camera.height;
        let axis = Stroke::solid(Color::WHITE, 2.0);

        self.canvas.stroke_path(
            &[ScreenPoint::new(0.0, h), ScreenPoint::new(0.0, 0.0), ScreenPoint::new(w, 0.0)],
            &axis,
        );

        if spacing <= 0.0 {
            return;
        }

        let mut offset = 0.0;
        while offset <= w / 2.0 {
            for x in [w / 2.0 + offset, w / 2.0 - offset] {
                self.canvas.stroke_path(&[ScreenPoint::new(x, 0.0), ScreenPoint::new(x, 5.0)], &axis);
            }
            offset += spacing;
        }

        let mut offset = 0.0;
        while offset <= h / 2.0 {
            for y in [h / 2.0 + offset, h / 2.0 - offset] {
                self.canvas.stroke_path(&[ScreenPoint::new(0.0, y), ScreenPoint::new(5.0, y)], &axis);
            }
            offset += spacing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_painter_maps_through_camera() {
        let mut camera = Camera::new(200.0, 100.0);
        camera.zoom = 2.0;
        let mut list = DrawList::new();

        {
            let mut painter = Painter::new(&mut list, &camera, 0);
            painter.circle(Position::new(20.0, 0.0), 8.0, &Fill::Solid(Color::TREE));
        }

        match &list.commands()[0] {
            DrawCommand::Circle { center, radius, .. } => {
                assert_eq!(*center, ScreenPoint::new(110.0, 50.0));
                assert_eq!(*radius, 4.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_clear_resets_list() {
        let mut list = DrawList::new();
        list.fill_polygon(&[ScreenPoint::default()], Color::WALL);
        list.clear(Color::GROUND);
        assert_eq!(list.commands(), &[DrawCommand::Clear(Color::GROUND)]);
    }

    #[test]
    fn test_reference_grid_notches() {
        let camera = Camera::new(200.0, 100.0);
        let mut list = DrawList::new();
        Painter::new(&mut list, &camera, 0).reference_grid(50.0);

        // axis + x notches (offsets 0, 50, 100; two each) + y notches (0, 50; two each)
        assert_eq!(list.count_paths(Color::WHITE), 1 + 6 + 4);
    }
}
