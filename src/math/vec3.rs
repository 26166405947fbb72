use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use approx::{AbsDiffEq, RelativeEq};

use crate::error::MathError;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    /// Forward in the right-handed GL convention looks down -Z.
    pub const FORWARD: Self = Self::new(0.0, 0.0, -1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn subtract(&self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    pub fn scale(&self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }

    /// Returns the unit vector in the same direction.
    ///
    /// A zero-length vector normalizes to [`Vec3::ZERO`] instead of NaN.
    pub fn normalize(&self) -> Self {
        let magnitude = self.magnitude();
        if magnitude > 0.0 {
            *self / magnitude
        } else {
            Self::ZERO
        }
    }

    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Returns the cross product of two vectors.
    /// The resulting vector is perpendicular to both input vectors.
    pub fn cross(&self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Returns the largest absolute component.
    pub fn max_abs(&self) -> f32 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }
}

/// Cross product of two untyped component slices.
///
/// Both operands must carry at least three components; any extra components
/// are ignored.
pub fn cross_slices(a: &[f32], b: &[f32]) -> Result<Vec3, MathError> {
    if a.len() < 3 || b.len() < 3 {
        return Err(MathError::InvalidArgument(format!(
            "cross product needs 3 components, got {} and {}",
            a.len(),
            b.len()
        )));
    }
    Ok(Vec3::new(a[0], a[1], a[2]).cross(Vec3::new(b[0], b[1], b[2])))
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Component-wise addition of two vectors.
impl Add<Vec3> for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl AddAssign<Vec3> for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

/// Component-wise subtraction of two vectors.
impl Sub<Vec3> for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Self::Output {
        self.subtract(rhs)
    }
}

/// Scalar multiplication of a vector.
impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Self::Output {
        self.scale(rhs)
    }
}

/// Scalar division of a vector.
impl Div<f32> for Vec3 {
    type Output = Vec3;

    fn div(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl AbsDiffEq for Vec3 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
    }
}

impl RelativeEq for Vec3 {
    fn default_max_relative() -> f32 {
        f32::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cross_of_axes_is_third_axis() {
        assert_eq!(Vec3::RIGHT.cross(Vec3::UP), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(Vec3::UP.cross(Vec3::RIGHT), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }

    #[test]
    fn normalize_has_unit_length() {
        let v = Vec3::new(3.0, 4.0, 12.0).normalize();
        assert_relative_eq!(v.magnitude(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(v, Vec3::new(3.0 / 13.0, 4.0 / 13.0, 12.0 / 13.0));
    }

    #[test]
    fn dot_and_subtract() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(b.subtract(a), Vec3::splat(3.0));
    }

    #[test]
    fn cross_slices_rejects_short_input() {
        let err = cross_slices(&[1.0, 0.0], &[0.0, 1.0, 0.0]).unwrap_err();
        assert!(matches!(err, MathError::InvalidArgument(_)));

        let v = cross_slices(&[1.0, 0.0, 0.0, 1.0], &[0.0, 1.0, 0.0]).unwrap();
        assert_eq!(v, Vec3::new(0.0, 0.0, 1.0));
    }
}
