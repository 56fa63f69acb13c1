//! Lightweight math types used across rastervg.

use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

// Tolerance for matrix comparisons.
const EPSILON: f64 = 1.0e-10;

/// 2D double-precision vector with basic arithmetic helpers.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Construct a new 2D vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (scalar).
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Vector magnitude.
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Squared vector magnitude.
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Distance to another point.
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Unit vector, or zero when the length is negligible.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > EPSILON {
            self / len
        } else {
            Self::ZERO
        }
    }

    /// Perpendicular vector (rotated 90 degrees counter-clockwise).
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Linear interpolation between two vectors.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f64> for Vec2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl DivAssign<f64> for Vec2 {
    fn div_assign(&mut self, rhs: f64) {
        self.x /= rhs;
        self.y /= rhs;
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

/// 2D affine transform stored as the six live coefficients of a 3x3
/// homogeneous matrix:
///
/// ```text
/// | sx  shx tx |
/// | shy sy  ty |
/// | 0   0   1  |
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine {
    /// Identity transform.
    pub const fn identity() -> Self {
        Self {
            sx: 1.0,
            shy: 0.0,
            shx: 0.0,
            sy: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Translation transform.
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self {
            sx: 1.0,
            shy: 0.0,
            shx: 0.0,
            sy: 1.0,
            tx,
            ty,
        }
    }

    /// Uniform scale transform.
    pub const fn scaling(s: f64) -> Self {
        Self {
            sx: s,
            shy: 0.0,
            shx: 0.0,
            sy: s,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Non-uniform scale transform.
    pub const fn scaling_xy(sx: f64, sy: f64) -> Self {
        Self {
            sx,
            shy: 0.0,
            shx: 0.0,
            sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Rotation transform (radians, counter-clockwise).
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            sx: cos,
            shy: sin,
            shx: -sin,
            sy: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Multiply by another transform on the right: `self = self * other`.
    ///
    /// Matches the composition order of chained `*=` on an AGG-style
    /// affine — the operand applies after the existing transform.
    pub fn multiply(&mut self, other: &Affine) {
        let t0 = self.sx * other.sx + self.shy * other.shx;
        let t2 = self.shx * other.sx + self.sy * other.shx;
        let t4 = self.tx * other.sx + self.ty * other.shx + other.tx;
        self.shy = self.sx * other.shy + self.shy * other.sy;
        self.sy = self.shx * other.shy + self.sy * other.sy;
        self.ty = self.tx * other.shy + self.ty * other.sy + other.ty;
        self.sx = t0;
        self.shx = t2;
        self.tx = t4;
    }

    /// Reset to identity.
    pub fn reset(&mut self) {
        *self = Self::identity();
    }

    /// Transform a point (includes translation).
    pub fn transform_point(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            v.x * self.sx + v.y * self.shx + self.tx,
            v.x * self.shy + v.y * self.sy + self.ty,
        )
    }

    /// Check whether the transform is (approximately) identity.
    pub fn is_identity(&self) -> bool {
        (self.sx - 1.0).abs() < EPSILON
            && self.shy.abs() < EPSILON
            && self.shx.abs() < EPSILON
            && (self.sy - 1.0).abs() < EPSILON
            && self.tx.abs() < EPSILON
            && self.ty.abs() < EPSILON
    }
}

/// Round `v` up to the next power of two, with a floor of 1.
pub fn next_power_of_two(v: u32) -> u32 {
    v.max(1).next_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_then_scale_applies_in_order() {
        let mut t = Affine::identity();
        t.multiply(&Affine::translation(10.0, 0.0));
        t.multiply(&Affine::scaling(2.0));
        // Point at origin: translated to (10, 0), then scaled to (20, 0).
        let p = t.transform_point(Vec2::ZERO);
        assert!((p.x - 20.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn rotation_quarter_turn() {
        let t = Affine::rotation(std::f64::consts::FRAC_PI_2);
        let p = t.transform_point(Vec2::new(1.0, 0.0));
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn identity_round_trip() {
        let mut t = Affine::identity();
        t.multiply(&Affine::translation(0.0, 0.0));
        assert!(t.is_identity());
        let p = Vec2::new(3.5, -7.25);
        assert_eq!(t.transform_point(p), p);
    }

    #[test]
    fn next_power_of_two_rounds_up() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(64), 64);
        assert_eq!(next_power_of_two(65), 128);
    }
}
