//! Scene-geometry pipeline for real-time mesh rendering.
//!
//! This crate turns mesh descriptions (ASCII PLY, OBJ or built-in shapes) into
//! interleaved vertex arrays with per-vertex normals, and turns per-entity
//! position/orientation/scale into model matrices. It never owns a graphics
//! device: the embedding application implements [`render::Renderer`] and
//! receives buffers and matrices ready to upload.
//!
//! # Quick Start
//!
//! ```ignore
//! use meshwork::prelude::*;
//!
//! let registry = ShaderRegistry::from_source(VERTEX_SHADER, |q, name| backend.locate(q, name))?;
//! let mut scene = Scene::new(Camera::default());
//!
//! let mut cube = Entity::new("cube").with_motion(Motion::spin(45.0, 0.0, 0.0));
//! cube.upload(&Mesh::cube(), &VertexLayout::default(), &mut backend, &registry)?;
//! scene.add(cube);
//!
//! scene.update(elapsed);
//! scene.render(&mut backend, &registry)?;
//! ```

// Public API - exposed to library consumers
pub mod assets;
pub mod entity;
pub mod error;
pub mod math;
pub mod mesh;
pub mod normals;
pub mod obj;
pub mod ply;
pub mod projection;
pub mod render;
pub mod scene;
pub mod transform;

// Re-export commonly needed types at crate root for convenience
pub use entity::Entity;
pub use error::{BindError, LoadError, MathError, ParseError, ParseWarning, RenderError};
pub use mesh::{Mesh, VertexLayout};
pub use projection::{Camera, CameraParams};
pub use scene::Scene;
pub use transform::TransformState;

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use meshwork::prelude::*;
///
/// let mesh = Mesh::tetrahedron();
/// assert_eq!(mesh.triangle_count(), 4);
/// ```
pub mod prelude {
    // Assets
    pub use crate::assets::{load_ply, AssetSource, FsAssets, ImageData};

    // Entities & scene
    pub use crate::entity::{Entity, Motion, Positionable, Renderable, Rotatable, Scalable};
    pub use crate::scene::Scene;

    // Mesh
    pub use crate::mesh::{AttributeKind, Mesh, VertexAttribute, VertexLayout};
    pub use crate::ply::ParseOptions;

    // Projection & transform
    pub use crate::projection::{Camera, CameraParams, ProjectionMode};
    pub use crate::transform::TransformState;

    // Math
    pub use crate::math::mat3::Mat3;
    pub use crate::math::mat4::Mat4;
    pub use crate::math::vec2::Vec2;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;

    // Rendering
    pub use crate::render::{Renderer, ShaderRegistry, UniformVector};

    // Errors
    pub use crate::error::{BindError, LoadError, MathError, ParseError, RenderError};
}
