//! 2x2 matrix, stored transposed like [`super::mat4::Mat4`].
//!
//! Nothing in the pipeline needs it; it is a public value type for consumers
//! working with planar data such as texture coordinates.

use super::mat4::SINGULAR_EPSILON;
use super::vec2::Vec2;
use crate::error::MathError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat2 {
    data: [f32; 4],
}

impl Default for Mat2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat2 {
    pub fn identity() -> Self {
        Self::from_storage([1.0, 0.0, 0.0, 1.0])
    }

    pub fn from_rows(rows: [[f32; 2]; 2]) -> Self {
        Self::from_storage([rows[0][0], rows[1][0], rows[0][1], rows[1][1]])
    }

    pub const fn from_storage(data: [f32; 4]) -> Self {
        Self { data }
    }

    /// 2D rotation, angle in degrees.
    pub fn rotation(degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::from_rows([[c, -s], [s, c]])
    }

    pub fn as_slice(&self) -> &[f32; 4] {
        &self.data
    }

    pub fn transpose(&self) -> Self {
        let [a, b, c, d] = self.data;
        Self::from_storage([a, c, b, d])
    }

    pub fn determinant(&self) -> f32 {
        let [a, b, c, d] = self.data;
        a * d - b * c
    }

    pub fn inverse(&self) -> Result<Self, MathError> {
        let det = self.determinant();
        if det.abs() < SINGULAR_EPSILON {
            return Err(MathError::SingularMatrix { determinant: det });
        }
        let [a, b, c, d] = self.data;
        Ok(Self::from_storage([d / det, -b / det, -c / det, a / det]))
    }

    pub fn transform(&self, v: Vec2) -> Vec2 {
        let m = &self.data;
        Vec2::new(m[0] * v.x + m[2] * v.y, m[1] * v.x + m[3] * v.y)
    }
}

impl std::ops::Mul for Mat2 {
    type Output = Mat2;

    fn mul(self, rhs: Mat2) -> Mat2 {
        let [a0, a1, a2, a3] = self.data;
        let [b0, b1, b2, b3] = rhs.data;
        Mat2::from_storage([
            a0 * b0 + a1 * b2,
            a0 * b1 + a1 * b3,
            a2 * b0 + a3 * b2,
            a2 * b1 + a3 * b3,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_and_transpose() {
        let m = Mat2::from_rows([[4.0, 7.0], [2.0, 6.0]]);
        assert_eq!(m.determinant(), 10.0);
        let product = m * m.inverse().unwrap();
        for (got, want) in product.as_slice().iter().zip(Mat2::identity().as_slice()) {
            assert!((got - want).abs() < 1e-6);
        }
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn rotation_quarter_turn() {
        let v = Mat2::rotation(90.0).transform(Vec2::new(1.0, 0.0));
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn singular_is_rejected() {
        assert!(Mat2::from_rows([[1.0, 2.0], [2.0, 4.0]]).inverse().is_err());
    }
}
