//! Camera Transform
//!
//! Maps world coordinates to canvas coordinates and back. Canvas space has its
//! origin at the bottom-left corner with y pointing up, the same orientation
//! as the world.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Position;

/// A point in canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Pixels from the left edge
    pub x: f64,
    /// Pixels from the bottom edge
    pub y: f64,
}

impl ScreenPoint {
    /// Create a screen point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset by a pixel delta.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned world rectangle currently visible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewRect {
    /// World point at the canvas center
    pub center: Position,
    /// Visible world width
    pub width: f64,
    /// Visible world height
    pub height: f64,
}

impl ViewRect {
    /// True if `p` is inside the rectangle grown by `margin` on every side.
    pub fn contains(&self, p: Position, margin: f64) -> bool {
        let half_w = self.width / 2.0 + margin;
        let half_h = self.height / 2.0 + margin;
        self.center.x - half_w <= p.x
            && p.x <= self.center.x + half_w
            && self.center.y - half_h <= p.y
            && p.y <= self.center.y + half_h
    }
}

/// View transform: pan offset, zoom factor and canvas size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World point shown at the canvas center
    pub view_pos: Position,
    /// World units per pixel
    pub zoom: f64,
    /// Canvas width in pixels
    pub width: f64,
    /// Canvas height in pixels
    pub height: f64,
}

impl Camera {
    /// Camera centered on the world origin at zoom 1.
    pub fn new(width: f64, height: f64) -> Self {
        Self { view_pos: Position::ORIGIN, zoom: 1.0, width, height }
    }

    /// Canvas center.
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }

    /// Update the canvas size, keeping pan and zoom.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// `screen = (world - view_pos) / zoom + center`
    pub fn world_to_screen(&self, p: Position) -> ScreenPoint {
        let c = self.center();
        ScreenPoint::new(
            (p.x - self.view_pos.x) / self.zoom + c.x,
            (p.y - self.view_pos.y) / self.zoom + c.y,
        )
    }

    /// `world = (screen - center) * zoom + view_pos`
    pub fn screen_to_world(&self, s: ScreenPoint) -> Position {
        let c = self.center();
        Position::new(
            (s.x - c.x) * self.zoom + self.view_pos.x,
            (s.y - c.y) * self.zoom + self.view_pos.y,
        )
    }

    /// Length in pixels of a world distance.
    pub fn to_pixels(&self, world_len: f64) -> f64 {
        world_len / self.zoom
    }

    /// Change zoom by `delta`. Rejected (returns `false`) unless the result
    /// stays strictly above `min_zoom`.
    pub fn zoom_by(&mut self, delta: f64, min_zoom: f64) -> bool {
        let proposed = self.zoom + delta;
        if proposed > min_zoom && proposed.is_finite() {
            self.zoom = proposed;
            true
        } else {
            false
        }
    }

    /// Move the view so the world point `anchor` sits under `cursor`.
    pub fn pan_to(&mut self, anchor: Position, cursor: ScreenPoint) {
        let c = self.center();
        self.view_pos = Position::new(
            anchor.x - (cursor.x - c.x) * self.zoom,
            anchor.y - (cursor.y - c.y) * self.zoom,
        );
    }

    /// World rectangle covered by the canvas.
    pub fn visible(&self) -> ViewRect {
        ViewRect {
            center: self.view_pos,
            width: self.width * self.zoom,
            height: self.height * self.zoom,
        }
    }
}
