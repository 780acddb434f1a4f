//! Tagged 2D Vectors
//!
//! A plain [`Vector`] carries the shared algebra. [`Position`] (a world
//! coordinate) and [`Direction`] (a heading or offset) are distinct types and
//! never convert into each other implicitly. Going through a [`Vector`] keeps
//! the tag, so an accidental re-tag fails with [`ConversionError`].

use std::fmt;
use std::ops::{Add, Neg, Sub};
use serde::{Serialize, Deserialize};

/// Raw `[x, y]` pair as it appears on the wire.
pub type RawVector = [f64; 2];

/// Tolerance used when comparing angles that must land exactly on an axis.
const AXIS_EPSILON: f64 = 1e-9;

/// Convert degrees to radians.
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

/// Convert radians to degrees.
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / std::f64::consts::PI
}

/// Wrap an angle in degrees into (-180, 180].
#[inline]
pub fn wrap_degrees(deg: f64) -> f64 {
    let mut wrapped = deg % 360.0;
    if wrapped > 180.0 {
        wrapped -= 360.0;
    } else if wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

// =============================================================================
// VECTOR KIND / CONVERSION ERROR
// =============================================================================

/// What a [`Vector`] was derived from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VectorKind {
    /// Untagged value (constructed directly from components).
    #[default]
    Free,
    /// Derived from a [`Position`].
    Position,
    /// Derived from a [`Direction`].
    Direction,
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorKind::Free => write!(f, "vector"),
            VectorKind::Position => write!(f, "position"),
            VectorKind::Direction => write!(f, "direction"),
        }
    }
}

/// Attempted to treat a position as a direction or the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The vector carries the other tag.
    #[error("invalid conversion: a {from} can never be a {to}")]
    InvalidConversion {
        /// Tag the vector carries.
        from: VectorKind,
        /// Tag that was requested.
        to: VectorKind,
    },
}

// =============================================================================
// VECTOR
// =============================================================================

/// 2D vector with the shared algebra.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    kind: VectorKind,
}

impl Vector {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, kind: VectorKind::Free };

    /// Create an untagged vector.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, kind: VectorKind::Free }
    }

    /// Tag this vector was derived from.
    #[inline]
    pub fn kind(self) -> VectorKind {
        self.kind
    }

    /// Add another vector.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Subtract another vector.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Rescale to magnitude `s`, keeping the direction.
    ///
    /// This does not multiply the current magnitude. A zero vector stays zero.
    #[inline]
    pub fn scale(self, s: f64) -> Self {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return Self::ZERO;
        }
        Self::new(self.x * s / magnitude, self.y * s / magnitude)
    }

    /// Unit vector along this one.
    #[inline]
    pub fn normalize(self) -> Self {
        self.scale(1.0)
    }

    /// Dot product with another vector.
    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Length.
    #[inline]
    pub fn magnitude(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Both components finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Components as a raw pair.
    #[inline]
    pub fn raw(self) -> RawVector {
        [self.x, self.y]
    }

    /// Reinterpret as a position.
    ///
    /// Fails if the vector came from a [`Direction`].
    pub fn as_position(self) -> Result<Position, ConversionError> {
        match self.kind {
            VectorKind::Direction => Err(ConversionError::InvalidConversion {
                from: VectorKind::Direction,
                to: VectorKind::Position,
            }),
            _ => Ok(Position::new(self.x, self.y)),
        }
    }

    /// Reinterpret as a direction.
    ///
    /// Fails if the vector came from a [`Position`].
    pub fn as_direction(self) -> Result<Direction, ConversionError> {
        match self.kind {
            VectorKind::Position => Err(ConversionError::InvalidConversion {
                from: VectorKind::Position,
                to: VectorKind::Direction,
            }),
            _ => Ok(Direction::new(self.x, self.y)),
        }
    }

    /// Drop the tag. This is the explicit, intentional re-tag.
    #[inline]
    pub fn untagged(self) -> Self {
        Self::new(self.x, self.y)
    }
}

impl Add for Vector {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Vector::add(self, rhs)
    }
}

impl Sub for Vector {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Vector::sub(self, rhs)
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector({:.3}, {:.3})", self.x, self.y)
    }
}

// =============================================================================
// POSITION
// =============================================================================

/// Absolute world coordinate.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Position {
    /// World origin
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a position.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create from a wire pair.
    #[inline]
    pub fn from_raw([x, y]: RawVector) -> Self {
        Self::new(x, y)
    }

    /// Wire pair.
    #[inline]
    pub fn raw(self) -> RawVector {
        [self.x, self.y]
    }

    /// Position-tagged vector.
    #[inline]
    pub fn vector(self) -> Vector {
        Vector { x: self.x, y: self.y, kind: VectorKind::Position }
    }

    /// Distance to another position.
    #[inline]
    pub fn distance_to(self, other: Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Offset from here to `other`.
    #[inline]
    pub fn vector_to(self, other: Self) -> Direction {
        Direction::new(other.x - self.x, other.y - self.y)
    }

    /// Both components finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add<Direction> for Position {
    type Output = Position;
    #[inline]
    fn add(self, rhs: Direction) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub<Direction> for Position {
    type Output = Position;
    #[inline]
    fn sub(self, rhs: Direction) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({:.3}, {:.3})", self.x, self.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

/// Heading or offset. Not a location.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Direction {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Direction {
    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };

    /// Unit vector pointing up (+Y)
    pub const UP: Self = Self { x: 0.0, y: 1.0 };

    /// Unit vector pointing down (-Y)
    pub const DOWN: Self = Self { x: 0.0, y: -1.0 };

    /// Create a direction.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create from a wire pair.
    #[inline]
    pub fn from_raw([x, y]: RawVector) -> Self {
        Self::new(x, y)
    }

    /// Wire pair.
    #[inline]
    pub fn raw(self) -> RawVector {
        [self.x, self.y]
    }

    /// Direction-tagged vector.
    #[inline]
    pub fn vector(self) -> Vector {
        Vector { x: self.x, y: self.y, kind: VectorKind::Direction }
    }

    /// Length.
    #[inline]
    pub fn magnitude(self) -> f64 {
        self.vector().magnitude()
    }

    /// Rescale to magnitude `s` (see [`Vector::scale`]).
    #[inline]
    pub fn scale(self, s: f64) -> Self {
        let v = self.vector().scale(s);
        Self::new(v.x, v.y)
    }

    /// Unit direction.
    #[inline]
    pub fn normalize(self) -> Self {
        self.scale(1.0)
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.vector().dot(other.vector())
    }

    /// Signed angle from the positive x-axis in degrees, in (-180, 180].
    pub fn reflex_angle(self) -> f64 {
        if self.y == 0.0 {
            if self.x >= 0.0 { 0.0 } else { 180.0 }
        } else if self.x == 0.0 {
            if self.y >= 0.0 { 90.0 } else { -90.0 }
        } else {
            let base = (self.y / self.x).atan();
            let correction = if self.x < 0.0 {
                self.y.signum() * std::f64::consts::PI
            } else {
                0.0
            };
            rad_to_deg(base + correction)
        }
    }

    /// Signed difference `self - other` of the reflex angles, in (-180, 180].
    ///
    /// Negative when `other` lies counter-clockwise of `self`.
    pub fn angle_between(self, other: Self) -> f64 {
        wrap_degrees(self.reflex_angle() - other.reflex_angle())
    }

    /// Rotate clockwise by `deg` degrees. The result is a unit direction.
    pub fn rotate_by(self, deg: f64) -> Self {
        let angle = wrap_degrees(self.reflex_angle() - deg);

        if (angle - 90.0).abs() < AXIS_EPSILON {
            Self::UP
        } else if (angle + 90.0).abs() < AXIS_EPSILON {
            Self::DOWN
        } else {
            let x = if !(-90.0..=90.0).contains(&angle) { -1.0 } else { 1.0 };
            Self::new(x, x * deg_to_rad(angle).tan()).normalize()
        }
    }

    /// Both components finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Direction {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Direction {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Direction {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Direction({:.3}, {:.3})", self.x, self.y)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{:.2}, {:.2}>", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================
