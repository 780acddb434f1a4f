//! Lines, Rays and Segments
//!
//! Intersection queries between the three infinite/semi-infinite/bounded
//! constructs. Parallel or ill-conditioned queries are not errors: they
//! simply report no intersection.

use serde::{Serialize, Deserialize};

use super::vec2::{Direction, Position};

/// Slopes closer than this are treated as parallel.
pub const PARALLEL_TOLERANCE: f64 = 0.01;

/// Maximum perpendicular distance for a point to count as on a segment.
pub const COLLINEAR_TOLERANCE: f64 = 0.01;

/// True when both values are non-zero with the same sign.
#[inline]
pub fn same_sign(a: f64, b: f64) -> bool {
    (a < 0.0 && b < 0.0) || (a > 0.0 && b > 0.0)
}

/// Solve for the crossing of the infinite lines through `(p0, p1)` and
/// `(p2, p3)`.
///
/// Returns `None` for parallel lines (slopes within [`PARALLEL_TOLERANCE`])
/// and when both lines are vertical.
pub fn solve_crossing(p0: Position, p1: Position, p2: Position, p3: Position) -> Option<Position> {
    let a = (p1.y - p0.y) / (p1.x - p0.x);
    let b = (p3.y - p2.y) / (p3.x - p2.x);
    let a_vertical = !a.is_finite();
    let b_vertical = !b.is_finite();

    if a_vertical && b_vertical {
        return None;
    }
    if a_vertical {
        let d = p2.y - b * p2.x;
        return Some(Position::new(p0.x, b * p0.x + d));
    }
    if b_vertical {
        let c = p0.y - a * p0.x;
        return Some(Position::new(p2.x, a * p2.x + c));
    }
    if (a - b).abs() <= PARALLEL_TOLERANCE {
        return None;
    }

    let c = p0.y - a * p0.x;
    let d = p2.y - b * p2.x;
    let x = (d - c) / (a - b);
    Some(Position::new(x, a * x + c))
}

// =============================================================================
// CONSTRUCTS
// =============================================================================

/// Infinite line through two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// First defining point
    pub p1: Position,
    /// Second defining point
    pub p2: Position,
}

impl Line {
    /// Create a line through two points.
    pub const fn new(p1: Position, p2: Position) -> Self {
        Self { p1, p2 }
    }

    /// Intersection with any construct.
    pub fn intersection(&self, other: &Construct) -> Option<Position> {
        intersect(&Construct::Line(*self), other)
    }
}

/// Half-line from an origin along a direction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Origin
    pub origin: Position,
    /// Heading
    pub dir: Direction,
}

impl Ray {
    /// Create a ray.
    pub const fn new(origin: Position, dir: Direction) -> Self {
        Self { origin, dir }
    }

    /// True if `point` lies ahead of the origin.
    ///
    /// Each axis must share the sign of the heading; an axis where the
    /// heading is zero is not checked.
    pub fn points_toward(&self, point: Position) -> bool {
        let to_point = self.origin.vector_to(point);
        let x_ok = self.dir.x == 0.0 || same_sign(self.dir.x, to_point.x);
        let y_ok = self.dir.y == 0.0 || same_sign(self.dir.y, to_point.y);
        x_ok && y_ok
    }

    /// Intersection with any construct.
    pub fn intersection(&self, other: &Construct) -> Option<Position> {
        intersect(&Construct::Ray(*self), other)
    }
}

/// Bounded segment between two points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start point
    pub p1: Position,
    /// End point
    pub p2: Position,
}

impl Segment {
    /// Create a segment.
    pub const fn new(p1: Position, p2: Position) -> Self {
        Self { p1, p2 }
    }

    /// Segment length.
    pub fn length(&self) -> f64 {
        self.p1.distance_to(self.p2)
    }

    /// True if `pt` is inside the bounding box and on the segment's line.
    pub fn contains_point(&self, pt: Position) -> bool {
        let (min_x, max_x) = (self.p1.x.min(self.p2.x), self.p1.x.max(self.p2.x));
        let (min_y, max_y) = (self.p1.y.min(self.p2.y), self.p1.y.max(self.p2.y));
        // Crossings are solved from the other construct's slope, so an
        // axis-aligned segment needs slack on its flat side
        let slack = COLLINEAR_TOLERANCE;
        if pt.x < min_x - slack || pt.x > max_x + slack || pt.y < min_y - slack || pt.y > max_y + slack {
            return false;
        }

        let along = self.p1.vector_to(self.p2);
        let to_pt = self.p1.vector_to(pt);
        let length = along.magnitude();
        if length == 0.0 {
            return to_pt.magnitude() <= COLLINEAR_TOLERANCE;
        }
        let cross = along.x * to_pt.y - along.y * to_pt.x;
        (cross / length).abs() <= COLLINEAR_TOLERANCE
    }

    /// Intersection with any construct.
    pub fn intersection(&self, other: &Construct) -> Option<Position> {
        intersect(&Construct::Segment(*self), other)
    }
}

/// Any of the three constructs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Construct {
    /// Infinite line
    Line(Line),
    /// Half-line
    Ray(Ray),
    /// Bounded segment
    Segment(Segment),
}

impl Construct {
    /// Two points on the construct's supporting line.
    fn defining_points(&self) -> (Position, Position) {
        match self {
            Construct::Line(l) => (l.p1, l.p2),
            Construct::Ray(r) => (r.origin, r.origin + r.dir),
            Construct::Segment(s) => (s.p1, s.p2),
        }
    }

    /// Coincident defining points: no supporting line exists.
    fn is_degenerate(&self) -> bool {
        let (a, b) = self.defining_points();
        a == b
    }

    /// Extent check for a point already known to be on the supporting line.
    fn accepts(&self, point: Position) -> bool {
        match self {
            Construct::Line(_) => true,
            Construct::Ray(r) => r.points_toward(point),
            Construct::Segment(s) => s.contains_point(point),
        }
    }
}

impl From<Line> for Construct {
    fn from(line: Line) -> Self {
        Construct::Line(line)
    }
}

impl From<Ray> for Construct {
    fn from(ray: Ray) -> Self {
        Construct::Ray(ray)
    }
}

impl From<Segment> for Construct {
    fn from(segment: Segment) -> Self {
        Construct::Segment(segment)
    }
}

/// Intersection point of two constructs, if any.
pub fn intersect(a: &Construct, b: &Construct) -> Option<Position> {
    if a.is_degenerate() || b.is_degenerate() {
        return None;
    }

    let (p0, p1) = a.defining_points();
    let (p2, p3) = b.defining_points();
    let point = solve_crossing(p0, p1, p2, p3)?;

    if a.accepts(point) && b.accepts(point) {
        Some(point)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    fn assert_near(actual: Option<Position>, x: f64, y: f64) {
        let p = actual.expect("expected an intersection");
        assert!((p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9, "got {p:?}");
    }

    #[test]
    fn test_crossing_segments() {
        let s1 = Segment::new(pos(0.0, 0.0), pos(10.0, 10.0));
        let s2 = Segment::new(pos(0.0, 10.0), pos(10.0, 0.0));
        assert_near(s1.intersection(&s2.into()), 5.0, 5.0);
    }

    #[test]
    fn test_rays_cross_horizontal_segment() {
        let wall = Segment::new(pos(-1000.0, 1.0), pos(1000.0, 1.0));
        for i in -99..=99 {
            let heading = Direction::new(0.37 * i as f64, 7.0);
            let ray = Ray::new(Position::ORIGIN, heading);
            let hit = ray.intersection(&wall.into());
            assert_near(hit, 0.37 * i as f64 / 7.0, 1.0);
        }
    }

    #[test]
    fn test_steep_segment_crosses_horizontal_segment() {
        let floor = Segment::new(pos(0.0, 3.0), pos(10.0, 3.0));
        let steep = Segment::new(pos(3.1, -40.0), pos(3.3, 50.0));
        let hit = steep.intersection(&floor.into()).expect("expected an intersection");
        assert!((hit.y - 3.0).abs() < 1e-9);
        assert!(floor.contains_point(hit));
    }

    #[test]
    fn test_parallel_lines_do_not_meet() {
        let l1 = Line::new(pos(0.0, 0.0), pos(10.0, 0.0));
        let l2 = Line::new(pos(0.0, 5.0), pos(10.0, 5.0));
        assert_eq!(l1.intersection(&l2.into()), None);
    }

    #[test]
    fn test_both_vertical() {
        let l1 = Line::new(pos(0.0, 0.0), pos(0.0, 10.0));
        let l2 = Line::new(pos(5.0, 0.0), pos(5.0, 10.0));
        assert_eq!(l1.intersection(&l2.into()), None);
    }

    #[test]
    fn test_ray_against_vertical_segment() {
        let wall = Segment::new(pos(5.0, -5.0), pos(5.0, 5.0));

        let forward = Ray::new(pos(0.0, 0.0), Direction::new(1.0, 0.0));
        assert_near(forward.intersection(&wall.into()), 5.0, 0.0);

        let reversed = Ray::new(pos(0.0, 0.0), Direction::new(-1.0, 0.0));
        assert_eq!(reversed.intersection(&wall.into()), None);
    }

    #[test]
    fn test_segments_that_miss() {
        let s1 = Segment::new(pos(0.0, 0.0), pos(1.0, 1.0));
        let s2 = Segment::new(pos(0.0, 10.0), pos(10.0, 0.0));
        // Lines cross at (5, 5), outside s1
        assert_eq!(s1.intersection(&s2.into()), None);
        assert!(Line::new(s1.p1, s1.p2).intersection(&s2.into()).is_some());
    }

    #[test]
    fn test_ray_against_ray() {
        let r1 = Ray::new(pos(0.0, 0.0), Direction::new(1.0, 1.0));
        let r2 = Ray::new(pos(10.0, 0.0), Direction::new(-1.0, 1.0));
        assert_near(r1.intersection(&r2.into()), 5.0, 5.0);

        let away = Ray::new(pos(10.0, 0.0), Direction::new(1.0, -1.0));
        assert_eq!(r1.intersection(&away.into()), None);
    }

    #[test]
    fn test_line_against_ray_behind_origin() {
        let line = Line::new(pos(-5.0, -10.0), pos(-5.0, 10.0));
        let ray = Ray::new(pos(0.0, 0.0), Direction::new(1.0, 0.0));
        assert_eq!(line.intersection(&ray.into()), None);
        assert_eq!(ray.intersection(&line.into()), None);
    }

    #[test]
    fn test_degenerate_construct() {
        let point_line = Line::new(pos(1.0, 1.0), pos(1.0, 1.0));
        let line = Line::new(pos(0.0, 0.0), pos(10.0, 10.0));
        assert_eq!(intersect(&point_line.into(), &line.into()), None);
    }

    #[test]
    fn test_segment_contains_point() {
        let s = Segment::new(pos(0.0, 0.0), pos(10.0, 10.0));
        assert!(s.contains_point(pos(3.0, 3.0)));
        assert!(!s.contains_point(pos(3.0, 4.0)));
        assert!(!s.contains_point(pos(11.0, 11.0)));
    }
}
