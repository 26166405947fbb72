//! Vector and matrix types shared by the parser, normal estimator and
//! transform composer.
//!
//! Matrices are built from logical rows and stored transposed, ready to be
//! uploaded to a shader as-is. See [`mat4`] for the full convention.

pub mod mat2;
pub mod mat3;
pub mod mat4;
pub mod vec2;
pub mod vec3;
pub mod vec4;

pub use mat2::Mat2;
pub use mat3::Mat3;
pub use mat4::{wrap_degrees, Mat4};
pub use vec2::Vec2;
pub use vec3::{cross_slices, Vec3};
pub use vec4::Vec4;
