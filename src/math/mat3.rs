//! 3x3 matrix, stored transposed like [`Mat4`].

use approx::{AbsDiffEq, RelativeEq};

use super::mat4::{Mat4, SINGULAR_EPSILON};
use super::vec3::Vec3;
use crate::error::MathError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    data: [f32; 9],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat3 {
    pub fn identity() -> Self {
        Self::from_storage([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }

    pub fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self::from_storage([
            rows[0][0], rows[1][0], rows[2][0], //
            rows[0][1], rows[1][1], rows[2][1], //
            rows[0][2], rows[1][2], rows[2][2],
        ])
    }

    pub const fn from_storage(data: [f32; 9]) -> Self {
        Self { data }
    }

    pub fn as_slice(&self) -> &[f32; 9] {
        &self.data
    }

    /// Logical element at `row`, `col`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[col * 3 + row]
    }

    /// The rotation/scale block of a 4x4 matrix.
    pub fn from_mat4(m: &Mat4) -> Self {
        Self::from_rows([
            [m.get(0, 0), m.get(0, 1), m.get(0, 2)],
            [m.get(1, 0), m.get(1, 1), m.get(1, 2)],
            [m.get(2, 0), m.get(2, 1), m.get(2, 2)],
        ])
    }

    /// Inverse-transpose of the model's upper 3x3, for transforming normals.
    pub fn normal_matrix(model: &Mat4) -> Result<Self, MathError> {
        Ok(Self::from_mat4(model).inverse()?.transpose())
    }

    pub fn transpose(&self) -> Self {
        let m = &self.data;
        Self::from_storage([m[0], m[3], m[6], m[1], m[4], m[7], m[2], m[5], m[8]])
    }

    pub fn determinant(&self) -> f32 {
        let [a, b, c, d, e, f, g, h, i] = self.data;
        a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
    }

    pub fn inverse(&self) -> Result<Self, MathError> {
        let [a, b, c, d, e, f, g, h, i] = self.data;
        let det = self.determinant();
        if det.abs() < SINGULAR_EPSILON {
            return Err(MathError::SingularMatrix { determinant: det });
        }
        let inv_det = 1.0 / det;

        Ok(Self::from_storage([
            (e * i - f * h) * inv_det,
            (c * h - b * i) * inv_det,
            (b * f - c * e) * inv_det,
            (f * g - d * i) * inv_det,
            (a * i - c * g) * inv_det,
            (c * d - a * f) * inv_det,
            (d * h - e * g) * inv_det,
            (b * g - a * h) * inv_det,
            (a * e - b * d) * inv_det,
        ]))
    }

    /// Transforms a direction as a shader would.
    pub fn transform(&self, v: Vec3) -> Vec3 {
        let m = &self.data;
        Vec3::new(
            m[0] * v.x + m[3] * v.y + m[6] * v.z,
            m[1] * v.x + m[4] * v.y + m[7] * v.z,
            m[2] * v.x + m[5] * v.y + m[8] * v.z,
        )
    }
}

impl std::ops::Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        let a = &self.data;
        let b = &rhs.data;
        let mut r = [0.0f32; 9];
        for row in 0..3 {
            for col in 0..3 {
                r[row * 3 + col] =
                    a[row * 3] * b[col] + a[row * 3 + 1] * b[3 + col] + a[row * 3 + 2] * b[6 + col];
            }
        }
        Mat3::from_storage(r)
    }
}

impl AbsDiffEq for Mat3 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Mat3 {
    fn default_max_relative() -> f32 {
        f32::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}
