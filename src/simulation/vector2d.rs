//! Two-dimensional vector value type used for positions, velocities and forces.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use geo::Coord;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{Result, SimulationError};

/// A plain 2D vector. Arithmetic returns new values; only the assign
/// operators modify in place.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2D {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component (grows downwards in screen space).
    pub y: f64,
}

impl Vector2D {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a vector without validation.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Creates a vector, rejecting NaN and infinite components.
    pub fn try_new(x: f64, y: f64) -> Result<Self> {
        if x.is_finite() && y.is_finite() {
            Ok(Self { x, y })
        } else {
            Err(SimulationError::NonFiniteVector { x, y })
        }
    }

    /// Unit vector pointing at `angle` radians.
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    /// Uniformly random point inside `[0, width) x [0, height)`.
    pub fn random_in<R: Rng>(rng: &mut R, width: f64, height: f64) -> Self {
        Self::new(
            rng.random::<f64>() * width,
            rng.random::<f64>() * height,
        )
    }

    /// Random offset with each component uniform in `[-range, range]`.
    pub fn random_surrounding<R: Rng>(rng: &mut R, range: f64) -> Self {
        if range <= 0.0 {
            return Self::ZERO;
        }
        Self::new(
            rng.random_range(-range..=range),
            rng.random_range(-range..=range),
        )
    }

    /// True when both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// True for the zero vector.
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Euclidean length.
    pub fn mag(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Squared length, cheaper than [`Vector2D::mag`] for comparisons.
    pub fn mag_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Dot product.
    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Angle of the vector in radians, in `(-PI, PI]`.
    pub fn heading(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Unsigned angle between two vectors in `[0, PI]`. Zero if either is zero.
    pub fn angle_between(&self, other: Self) -> f64 {
        let denom = self.mag() * other.mag();
        if denom == 0.0 {
            return 0.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos()
    }

    /// Distance between two points.
    pub fn dist(&self, other: Self) -> f64 {
        (*self - other).mag()
    }

    /// Squared distance between two points.
    pub fn dist_sq(&self, other: Self) -> f64 {
        (*self - other).mag_sq()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(&self) -> Self {
        let m = self.mag();
        if m > 0.0 { *self / m } else { Self::ZERO }
    }

    /// Same direction, length `mag`.
    pub fn set_mag(&self, mag: f64) -> Self {
        self.normalize() * mag
    }

    /// Scales the vector down so its length does not exceed `max`.
    pub fn limit(&self, max: f64) -> Self {
        let max = max.max(0.0);
        if self.mag_sq() > max * max {
            self.set_mag(max)
        } else {
            *self
        }
    }

    /// Wraps the point into `[0, width) x [0, height)`.
    pub fn wrap(&self, width: f64, height: f64) -> Self {
        // rem_euclid can round up to the modulus for tiny negative inputs
        let wrap_axis = |v: f64, extent: f64| {
            let w = v.rem_euclid(extent);
            if w >= extent { 0.0 } else { w }
        };
        Self::new(wrap_axis(self.x, width), wrap_axis(self.y, height))
    }

    /// Clamps the point into `[0, width) x [0, height)`.
    ///
    /// Coordinates past the far edge land on the largest value below it.
    pub fn clamp_to(&self, width: f64, height: f64) -> Self {
        let below = |extent: f64| extent * (1.0 - f64::EPSILON);
        Self::new(self.x.clamp(0.0, below(width)), self.y.clamp(0.0, below(height)))
    }
}

impl Add for Vector2D {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2D {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2D {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2D {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vector2D {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vector2D {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2D {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<Vector2D> for Coord<f64> {
    fn from(v: Vector2D) -> Self {
        Coord { x: v.x, y: v.y }
    }
}

impl From<Coord<f64>> for Vector2D {
    fn from(c: Coord<f64>) -> Self {
        Self::new(c.x, c.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_caps_length_and_keeps_direction() {
        let v = Vector2D::new(3.0, 4.0).limit(1.0);
        assert!((v.mag() - 1.0).abs() < 1e-12);
        assert!((v.x - 0.6).abs() < 1e-12);
        assert_eq!(Vector2D::new(0.1, 0.1).limit(1.0), Vector2D::new(0.1, 0.1));
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vector2D::ZERO.normalize(), Vector2D::ZERO);
        assert_eq!(Vector2D::ZERO.set_mag(5.0), Vector2D::ZERO);
    }

    #[test]
    fn try_new_rejects_nan() {
        assert!(Vector2D::try_new(f64::NAN, 0.0).is_err());
        assert!(Vector2D::try_new(1.0, f64::INFINITY).is_err());
        assert!(Vector2D::try_new(1.0, 2.0).is_ok());
    }

    #[test]
    fn wrap_is_half_open() {
        let w = Vector2D::new(100.0, -1.0).wrap(100.0, 50.0);
        assert_eq!(w, Vector2D::new(0.0, 49.0));
    }

    #[test]
    fn clamp_to_stays_below_far_edge() {
        let c = Vector2D::new(130.0, -4.0).clamp_to(100.0, 50.0);
        assert!(c.x < 100.0 && c.x > 99.99);
        assert_eq!(c.y, 0.0);
        let edge = Vector2D::new(100.0, 50.0).clamp_to(100.0, 50.0);
        assert!(edge.x < 100.0 && edge.y < 50.0);
    }
}
