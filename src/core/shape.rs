//! Outlines and Oriented Rectangles
//!
//! Entity silhouettes are stored as local-space point templates and placed in
//! the world by rotating them to a heading and translating them to a position.
//! [`OrientedRect`] is the containment test shared by unit hit-testing and
//! drag selection.

use super::vec2::{deg_to_rad, Direction, Position, RawVector};

/// Rotate a local-space point counter-clockwise by `theta` radians.
#[inline]
pub fn rotate_point([x, y]: RawVector, theta: f64) -> RawVector {
    let (sin, cos) = theta.sin_cos();
    [x * cos - y * sin, x * sin + y * cos]
}

/// Local-space polygon template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outline<const N: usize> {
    points: [RawVector; N],
}

impl<const N: usize> Outline<N> {
    /// Create an outline from template points.
    pub const fn new(points: [RawVector; N]) -> Self {
        Self { points }
    }

    /// Template points, untransformed.
    pub fn points(&self) -> &[RawVector; N] {
        &self.points
    }

    /// Place the outline in the world, facing `heading` at `origin`.
    pub fn place(&self, origin: Position, heading: Direction) -> [Position; N] {
        let theta = deg_to_rad(heading.reflex_angle());
        self.points.map(|p| {
            let [x, y] = rotate_point(p, theta);
            Position::new(origin.x + x, origin.y + y)
        })
    }
}

/// Rectangle given by corner `a`, and the two corners `b` and `d` adjacent to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedRect {
    /// Reference corner
    pub a: Position,
    /// Corner adjacent to `a` along the first edge
    pub b: Position,
    /// Corner adjacent to `a` along the second edge
    pub d: Position,
}

impl OrientedRect {
    /// Create from three corners.
    pub const fn new(a: Position, b: Position, d: Position) -> Self {
        Self { a, b, d }
    }

    /// Axis-aligned rectangle spanning two opposite corners, in any order.
    pub fn from_corners(p: Position, q: Position) -> Self {
        let (min_x, max_x) = (p.x.min(q.x), p.x.max(q.x));
        let (min_y, max_y) = (p.y.min(q.y), p.y.max(q.y));
        Self {
            a: Position::new(min_x, min_y),
            b: Position::new(max_x, min_y),
            d: Position::new(min_x, max_y),
        }
    }

    /// Strict interior test via projections onto both edges.
    pub fn contains(&self, m: Position) -> bool {
        let am = self.a.vector_to(m);
        let ab = self.a.vector_to(self.b);
        let ad = self.a.vector_to(self.d);

        let am_ab = am.dot(ab);
        let am_ad = am.dot(ad);

        0.0 < am_ab && am_ab < ab.dot(ab) && 0.0 < am_ad && am_ad < ad.dot(ad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_rect_contains() {
        let rect = OrientedRect::new(pos(0.0, 0.0), pos(10.0, 0.0), pos(0.0, 10.0));
        assert!(rect.contains(pos(5.0, 5.0)));
        assert!(!rect.contains(pos(15.0, 5.0)));
    }

    #[test]
    fn test_rect_boundary_is_outside() {
        let rect = OrientedRect::new(pos(0.0, 0.0), pos(10.0, 0.0), pos(0.0, 10.0));
        assert!(!rect.contains(pos(0.0, 5.0)));
        assert!(!rect.contains(pos(10.0, 10.0)));
    }

    #[test]
    fn test_rect_rotated() {
        // Diamond centered on the origin
        let rect = OrientedRect::new(pos(0.0, -10.0), pos(10.0, 0.0), pos(-10.0, 0.0));
        assert!(rect.contains(pos(0.0, 0.0)));
        assert!(rect.contains(pos(4.0, 4.0)));
        assert!(!rect.contains(pos(8.0, 8.0)));
    }

    #[test]
    fn test_from_corners_any_order() {
        let a = OrientedRect::from_corners(pos(10.0, 10.0), pos(0.0, 0.0));
        let b = OrientedRect::from_corners(pos(0.0, 10.0), pos(10.0, 0.0));
        assert_eq!(a, b);
        assert!(a.contains(pos(1.0, 9.0)));
    }

    #[test]
    fn test_outline_place() {
        let outline = Outline::new([[15.0, 10.0], [15.0, -10.0]]);
        let placed = outline.place(pos(100.0, 100.0), Direction::UP);
        // Facing up: local +x maps to world +y
        assert!((placed[0].x - 90.0).abs() < 1e-9);
        assert!((placed[0].y - 115.0).abs() < 1e-9);
        assert!((placed[1].x - 110.0).abs() < 1e-9);
        assert!((placed[1].y - 115.0).abs() < 1e-9);
    }
}
