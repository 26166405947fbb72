//! 4x4 transformation matrix stored in GPU upload order.
//!
//! # Convention
//! - Constructors take the matrix **logically row-major** (the way it is
//!   written on paper) and store it **transposed**, so [`Mat4::as_slice`] can be
//!   handed to `uniformMatrix4fv`-style calls without a transpose flag.
//! - `*` is the plain row×column product over the 16-element storage arrays.
//!   Because every operand is stored transposed, `a * b` on storage equals
//!   `(B·A)ᵀ` logically: the left operand is applied to a vertex **first**.
//! - `Mat4 * Vec4` reads the storage column-major, exactly as a shader does.
//!
//! # Example
//! ```
//! use meshwork::math::{mat4::Mat4, vec3::Vec3, vec4::Vec4};
//!
//! let model = Mat4::rotation(90.0, 0.0, 0.0) * Mat4::translation(Vec3::new(1.0, 0.0, 0.0));
//! let moved = model * Vec4::point(0.0, 0.0, 0.0);
//! assert!((moved.x - 1.0).abs() < 1e-6);
//! ```

use std::ops::Mul;

use approx::{AbsDiffEq, RelativeEq};

use super::vec3::Vec3;
use super::vec4::Vec4;
use crate::error::MathError;

/// Determinant magnitude below which a matrix is treated as singular.
pub const SINGULAR_EPSILON: f32 = 1e-10;

/// 4x4 matrix as 16 floats in storage (column-major) order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    data: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        data: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Builds a matrix from logical rows, storing it transposed.
    pub fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self::from_storage([
            rows[0][0], rows[1][0], rows[2][0], rows[3][0], //
            rows[0][1], rows[1][1], rows[2][1], rows[3][1], //
            rows[0][2], rows[1][2], rows[2][2], rows[3][2], //
            rows[0][3], rows[1][3], rows[2][3], rows[3][3],
        ])
    }

    /// Wraps an array that is already in storage order.
    pub const fn from_storage(data: [f32; 16]) -> Self {
        Self { data }
    }

    /// The storage array, ready for upload.
    pub fn as_slice(&self) -> &[f32; 16] {
        &self.data
    }

    pub fn to_storage(self) -> [f32; 16] {
        self.data
    }

    /// Logical element at `row`, `col`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[col * 4 + row]
    }

    /// Creates a translation matrix.
    pub fn translation(v: Vec3) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, v.x],
            [0.0, 1.0, 0.0, v.y],
            [0.0, 0.0, 1.0, v.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates the entity scaling matrix.
    ///
    /// Only X and Y are scaled; Z keeps a factor of one. Use
    /// [`Mat4::scaling_xyz`] for an explicit per-axis scale.
    pub fn scaling(s: f32) -> Self {
        Self::scaling_xyz(s, s, 1.0)
    }

    /// Creates a per-axis scaling matrix.
    pub fn scaling_xyz(sx: f32, sy: f32, sz: f32) -> Self {
        Self::from_rows([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about the Y axis, angle in degrees.
    pub fn rotation_y(degrees: f32) -> Self {
        let (s, c) = wrap_degrees(degrees).to_radians().sin_cos();
        Self::from_rows([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about the X axis, angle in degrees.
    pub fn rotation_x(degrees: f32) -> Self {
        let (s, c) = wrap_degrees(degrees).to_radians().sin_cos();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about the Z axis, angle in degrees.
    pub fn rotation_z(degrees: f32) -> Self {
        let (s, c) = wrap_degrees(degrees).to_radians().sin_cos();
        Self::from_rows([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a rotation matrix from yaw (Y), pitch (X) and roll (Z) in degrees.
    ///
    /// The logical product is always `roll · pitch · yaw`; angles are wrapped
    /// into `[0, 360)` first, so `a` and `a + 360` give the same matrix.
    pub fn rotation(yaw: f32, pitch: f32, roll: f32) -> Self {
        let gamma = logical_rows(Self::rotation_z(roll));
        let beta = logical_rows(Self::rotation_x(pitch));
        let alpha = logical_rows(Self::rotation_y(yaw));
        // Compose the logical matrices, then store the product transposed.
        Self::from_rows(rows_product(gamma, rows_product(beta, alpha)))
    }

    /// Builds a view matrix from the camera basis and position.
    pub fn view(right: Vec3, up: Vec3, forward: Vec3, position: Vec3) -> Self {
        Self::from_rows([
            [right.x, up.x, forward.x, position.x],
            [right.y, up.y, forward.y, position.y],
            [right.z, up.z, forward.z, position.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// OpenGL-style perspective projection built from the view frustum.
    ///
    /// `fov` is the vertical field of view in degrees. `[near, far]` maps to
    /// `[-1, 1]` after the perspective divide.
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let top = near * (fov.to_radians() / 2.0).tan();
        let bottom = -top;
        let right = top * aspect;
        let left = -right;

        Self::from_rows([
            [
                2.0 * near / (right - left),
                0.0,
                0.0,
                -near * (right + left) / (right - left),
            ],
            [
                0.0,
                2.0 * near / (top - bottom),
                0.0,
                -near * (top + bottom) / (top - bottom),
            ],
            [
                0.0,
                0.0,
                -(far + near) / (far - near),
                2.0 * far * near / (near - far),
            ],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Orthographic box projection. The box half-extents are
    /// `width * aspect` and `height * aspect`.
    pub fn orthographic(width: f32, height: f32, aspect: f32, near: f32, far: f32) -> Self {
        let left = -width * aspect;
        let right = width * aspect;
        let top = height * aspect;
        let bottom = -height * aspect;

        Self::from_rows([
            [
                2.0 / (right - left),
                0.0,
                0.0,
                -(right + left) / (right - left),
            ],
            [
                0.0,
                2.0 / (top - bottom),
                0.0,
                -(top + bottom) / (top - bottom),
            ],
            [0.0, 0.0, -2.0 / (far - near), -(far + near) / (far - near)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Multiplies three matrices: `a * (b * c)`.
    pub fn multiply3(a: Mat4, b: Mat4, c: Mat4) -> Mat4 {
        a * (b * c)
    }

    /// Returns a new matrix with transpose applied.
    pub fn transpose(&self) -> Self {
        let m = &self.data;
        Self::from_storage([
            m[0], m[4], m[8], m[12], //
            m[1], m[5], m[9], m[13], //
            m[2], m[6], m[10], m[14], //
            m[3], m[7], m[11], m[15],
        ])
    }

    pub fn determinant(&self) -> f32 {
        let [m00, m01, m02, m03, m10, m11, m12, m13, m20, m21, m22, m23, m30, m31, m32, m33] =
            self.data;

        let c00 = m11 * (m22 * m33 - m23 * m32) - m12 * (m21 * m33 - m23 * m31)
            + m13 * (m21 * m32 - m22 * m31);
        let c01 = -(m10 * (m22 * m33 - m23 * m32) - m12 * (m20 * m33 - m23 * m30)
            + m13 * (m20 * m32 - m22 * m30));
        let c02 = m10 * (m21 * m33 - m23 * m31) - m11 * (m20 * m33 - m23 * m30)
            + m13 * (m20 * m31 - m21 * m30);
        let c03 = -(m10 * (m21 * m32 - m22 * m31) - m11 * (m20 * m32 - m22 * m30)
            + m12 * (m20 * m31 - m21 * m30));

        m00 * c00 + m01 * c01 + m02 * c02 + m03 * c03
    }

    /// Computes the inverse with the adjugate (cofactor) method.
    ///
    /// Returns [`MathError::SingularMatrix`] when `|det| < 1e-10`.
    pub fn inverse(&self) -> Result<Mat4, MathError> {
        let [m00, m01, m02, m03, m10, m11, m12, m13, m20, m21, m22, m23, m30, m31, m32, m33] =
            self.data;

        // Cofactors for the first row (needed for determinant)
        let c00 = m11 * (m22 * m33 - m23 * m32) - m12 * (m21 * m33 - m23 * m31)
            + m13 * (m21 * m32 - m22 * m31);
        let c01 = -(m10 * (m22 * m33 - m23 * m32) - m12 * (m20 * m33 - m23 * m30)
            + m13 * (m20 * m32 - m22 * m30));
        let c02 = m10 * (m21 * m33 - m23 * m31) - m11 * (m20 * m33 - m23 * m30)
            + m13 * (m20 * m31 - m21 * m30);
        let c03 = -(m10 * (m21 * m32 - m22 * m31) - m11 * (m20 * m32 - m22 * m30)
            + m12 * (m20 * m31 - m21 * m30));

        let det = m00 * c00 + m01 * c01 + m02 * c02 + m03 * c03;
        if det.abs() < SINGULAR_EPSILON {
            return Err(MathError::SingularMatrix { determinant: det });
        }

        let inv_det = 1.0 / det;

        let c10 = -(m01 * (m22 * m33 - m23 * m32) - m02 * (m21 * m33 - m23 * m31)
            + m03 * (m21 * m32 - m22 * m31));
        let c11 = m00 * (m22 * m33 - m23 * m32) - m02 * (m20 * m33 - m23 * m30)
            + m03 * (m20 * m32 - m22 * m30);
        let c12 = -(m00 * (m21 * m33 - m23 * m31) - m01 * (m20 * m33 - m23 * m30)
            + m03 * (m20 * m31 - m21 * m30));
        let c13 = m00 * (m21 * m32 - m22 * m31) - m01 * (m20 * m32 - m22 * m30)
            + m02 * (m20 * m31 - m21 * m30);

        let c20 = m01 * (m12 * m33 - m13 * m32) - m02 * (m11 * m33 - m13 * m31)
            + m03 * (m11 * m32 - m12 * m31);
        let c21 = -(m00 * (m12 * m33 - m13 * m32) - m02 * (m10 * m33 - m13 * m30)
            + m03 * (m10 * m32 - m12 * m30));
        let c22 = m00 * (m11 * m33 - m13 * m31) - m01 * (m10 * m33 - m13 * m30)
            + m03 * (m10 * m31 - m11 * m30);
        let c23 = -(m00 * (m11 * m32 - m12 * m31) - m01 * (m10 * m32 - m12 * m30)
            + m02 * (m10 * m31 - m11 * m30));

        let c30 = -(m01 * (m12 * m23 - m13 * m22) - m02 * (m11 * m23 - m13 * m21)
            + m03 * (m11 * m22 - m12 * m21));
        let c31 = m00 * (m12 * m23 - m13 * m22) - m02 * (m10 * m23 - m13 * m20)
            + m03 * (m10 * m22 - m12 * m20);
        let c32 = -(m00 * (m11 * m23 - m13 * m21) - m01 * (m10 * m23 - m13 * m20)
            + m03 * (m10 * m21 - m11 * m20));
        let c33 = m00 * (m11 * m22 - m12 * m21) - m01 * (m10 * m22 - m12 * m20)
            + m02 * (m10 * m21 - m11 * m20);

        // The inverse is the transpose of the cofactor matrix divided by determinant
        Ok(Self::from_storage([
            c00 * inv_det, c10 * inv_det, c20 * inv_det, c30 * inv_det, //
            c01 * inv_det, c11 * inv_det, c21 * inv_det, c31 * inv_det, //
            c02 * inv_det, c12 * inv_det, c22 * inv_det, c32 * inv_det, //
            c03 * inv_det, c13 * inv_det, c23 * inv_det, c33 * inv_det,
        ]))
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

fn logical_rows(m: Mat4) -> [[f32; 4]; 4] {
    let mut rows = [[0.0f32; 4]; 4];
    for (row, values) in rows.iter_mut().enumerate() {
        for (col, value) in values.iter_mut().enumerate() {
            *value = m.get(row, col);
        }
    }
    rows
}

fn rows_product(a: [[f32; 4]; 4], b: [[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let mut result = [[0.0f32; 4]; 4];
    for row in 0..4 {
        for col in 0..4 {
            result[row][col] = a[row][0] * b[0][col]
                + a[row][1] * b[1][col]
                + a[row][2] * b[2][col]
                + a[row][3] * b[3][col];
        }
    }
    result
}

/// Row×column product over the storage arrays.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let a = &self.data;
        let b = &rhs.data;
        let mut r = [0.0f32; 16];

        for row in 0..4 {
            for col in 0..4 {
                r[row * 4 + col] = a[row * 4] * b[col]
                    + a[row * 4 + 1] * b[4 + col]
                    + a[row * 4 + 2] * b[8 + col]
                    + a[row * 4 + 3] * b[12 + col];
            }
        }

        Mat4::from_storage(r)
    }
}

/// Transforms a column vector the way a shader reads the uploaded matrix.
impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Self::Output {
        let m = &self.data;
        Vec4::new(
            m[0] * v.x + m[4] * v.y + m[8] * v.z + m[12] * v.w,
            m[1] * v.x + m[5] * v.y + m[9] * v.z + m[13] * v.w,
            m[2] * v.x + m[6] * v.y + m[10] * v.z + m[14] * v.w,
            m[3] * v.x + m[7] * v.y + m[11] * v.z + m[15] * v.w,
        )
    }
}

impl AbsDiffEq for Mat4 {
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

impl RelativeEq for Mat4 {
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
