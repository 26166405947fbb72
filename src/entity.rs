//! Scene entities.
//!
//! An [`Entity`] is a [`TransformState`], an optional uploaded mesh and a
//! [`Motion`] applied every frame. Its behaviour is exposed through small
//! capability traits so scene code can be written against just the part it
//! needs.

use std::time::Duration;

use log::{debug, trace};

use crate::error::{BindError, MathError, RenderError};
use crate::math::{mat3::Mat3, vec3::Vec3};
use crate::mesh::{Mesh, VertexLayout};
use crate::render::{AttributeBinding, BufferHandle, Renderer, ShaderRegistry};
use crate::transform::TransformState;

// ============ Capabilities ============

pub trait Positionable {
    fn position(&mut self, position: Vec3);
    fn translate(&mut self, delta: Vec3);
}

/// Orientation in degrees: yaw about Y, pitch about X, roll about Z.
pub trait Rotatable {
    fn orient(&mut self, yaw: f32, pitch: f32, roll: f32);
    fn rotate(&mut self, dyaw: f32, dpitch: f32, droll: f32);
}

pub trait Scalable {
    fn set_scale(&mut self, scale: f32);
    fn grow(&mut self, sum: f32);
    fn shrink(&mut self, diff: f32);
}

pub trait Renderable {
    /// Bind this object's uniforms and buffers and issue its draw call.
    fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        registry: &ShaderRegistry,
    ) -> Result<(), RenderError>;
}

// ============ Motion ============

/// Constant per-second motion applied by [`Entity::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motion {
    /// Degrees per second as `(yaw, pitch, roll)`.
    pub spin: Vec3,
    /// Units per second.
    pub velocity: Vec3,
}

impl Motion {
    pub fn spin(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self {
            spin: Vec3::new(yaw, pitch, roll),
            velocity: Vec3::ZERO,
        }
    }

    pub fn is_still(&self) -> bool {
        self.spin == Vec3::ZERO && self.velocity == Vec3::ZERO
    }
}

// ============ Entity ============

/// Buffers of an uploaded mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Drawable {
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub index_count: usize,
    pub bindings: Vec<AttributeBinding>,
}

#[derive(Clone, Copy, Debug)]
struct CachedNormal {
    version: u64,
    matrix: Mat3,
}

#[derive(Clone, Debug)]
pub struct Entity {
    name: String,
    transform: TransformState,
    drawable: Option<Drawable>,
    motion: Motion,
    normal: Option<CachedNormal>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: TransformState::new(),
            drawable: None,
            motion: Motion::default(),
            normal: None,
        }
    }

    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut TransformState {
        &mut self.transform
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn set_motion(&mut self, motion: Motion) {
        self.motion = motion;
    }

    pub fn drawable(&self) -> Option<&Drawable> {
        self.drawable.as_ref()
    }

    pub fn is_uploaded(&self) -> bool {
        self.drawable.is_some()
    }

    /// Interleave `mesh` per `layout` and hand it to the renderer.
    ///
    /// Every attribute in `layout` must be declared by the program behind
    /// `registry`; nothing is uploaded otherwise.
    pub fn upload(
        &mut self,
        mesh: &Mesh,
        layout: &VertexLayout,
        renderer: &mut dyn Renderer,
        registry: &ShaderRegistry,
    ) -> Result<(), BindError> {
        let bindings = registry.bindings(layout)?;
        let vertex_buffer = renderer.upload_vertex_buffer(&mesh.interleave(layout));
        let index_buffer = renderer.upload_index_buffer(mesh.indices());

        debug!(
            "uploaded `{}`: {} vertices, {} triangles",
            self.name,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        self.drawable = Some(Drawable {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices().len(),
            bindings,
        });
        Ok(())
    }

    /// Advance by `elapsed` according to the entity's [`Motion`].
    pub fn update(&mut self, elapsed: Duration) {
        if self.motion.is_still() {
            return;
        }
        let dt = elapsed.as_secs_f32();
        let Motion { spin, velocity } = self.motion;
        if spin != Vec3::ZERO {
            self.transform.rotate(spin.x * dt, spin.y * dt, spin.z * dt);
        }
        if velocity != Vec3::ZERO {
            self.transform.translate(velocity * dt);
        }
    }

    /// Inverse-transpose of the model matrix, rebuilt only when the transform
    /// version moved since the last call.
    pub fn normal_matrix(&mut self) -> Result<Mat3, MathError> {
        let version = self.transform.version();
        if let Some(cached) = self.normal.filter(|c| c.version == version) {
            return Ok(cached.matrix);
        }
        let matrix = Mat3::normal_matrix(&self.transform.model())?;
        trace!("`{}` normal matrix rebuilt at version {version}", self.name);
        self.normal = Some(CachedNormal { version, matrix });
        Ok(matrix)
    }

    /// Transform version the cached normal matrix was built from.
    pub fn normal_matrix_version(&self) -> Option<u64> {
        self.normal.map(|c| c.version)
    }
}

impl Positionable for Entity {
    fn position(&mut self, position: Vec3) {
        self.transform.position(position);
    }

    fn translate(&mut self, delta: Vec3) {
        self.transform.translate(delta);
    }
}

impl Rotatable for Entity {
    fn orient(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.transform.orient(yaw, pitch, roll);
    }

    fn rotate(&mut self, dyaw: f32, dpitch: f32, droll: f32) {
        self.transform.rotate(dyaw, dpitch, droll);
    }
}

impl Scalable for Entity {
    fn set_scale(&mut self, scale: f32) {
        self.transform.set_scale(scale);
    }

    fn grow(&mut self, sum: f32) {
        self.transform.grow(sum);
    }

    fn shrink(&mut self, diff: f32) {
        self.transform.shrink(diff);
    }
}

impl Renderable for Entity {
    /// Binds `u_model`, plus `u_normal` when the program declares it.
    ///
    /// A singular normal matrix is returned as [`RenderError::Math`] before
    /// anything is bound.
    fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        registry: &ShaderRegistry,
    ) -> Result<(), RenderError> {
        if self.drawable.is_none() {
            return Err(BindError::NotUploaded(self.name.clone()).into());
        }

        let model = self.transform.model();
        let normal = if registry.has_uniform("u_normal") {
            Some(self.normal_matrix()?)
        } else {
            None
        };

        registry.bind_matrix(renderer, "u_model", &model)?;
        if let Some(normal) = normal {
            registry.bind_matrix3(renderer, "u_normal", &normal)?;
        }

        if let Some(drawable) = &self.drawable {
            renderer.bind_vertex_buffer(drawable.vertex_buffer, &drawable.bindings);
            renderer.bind_index_buffer(drawable.index_buffer);
            renderer.draw_indexed(drawable.index_count);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mat4::Mat4;
    use crate::render::recording::{registry, Call, RecordingRenderer};
    use crate::render::{Qualifier, UniformLocation};
    use approx::assert_relative_eq;

    fn uploaded_cube() -> (Entity, RecordingRenderer, ShaderRegistry) {
        let registry = registry();
        let mut renderer = RecordingRenderer::default();
        let mut entity = Entity::new("cube");
        entity
            .upload(&Mesh::cube(), &VertexLayout::default(), &mut renderer, &registry)
            .unwrap();
        renderer.calls.clear();
        (entity, renderer, registry)
    }

    #[test]
    fn upload_interleaves_and_records_buffers() {
        let registry = registry();
        let mut renderer = RecordingRenderer::default();
        let mut entity = Entity::new("tri");
        entity
            .upload(&Mesh::triangle(), &VertexLayout::default(), &mut renderer, &registry)
            .unwrap();

        let drawable = entity.drawable().unwrap();
        assert_eq!(drawable.index_count, 3);
        assert_eq!(drawable.bindings.len(), 4);
        match &renderer.calls[..] {
            [Call::UploadVertices(v), Call::UploadIndices(i)] => {
                assert_eq!(v.len(), 36);
                assert_eq!(i, &vec![0, 1, 2]);
            }
            other => panic!("unexpected calls {other:?}"),
        }
    }

    #[test]
    fn upload_fails_fast_on_unknown_attribute() {
        let registry = ShaderRegistry::from_source("in vec3 a_pos;\n", |_, _| Some(0)).unwrap();
        let mut renderer = RecordingRenderer::default();
        let mut entity = Entity::new("tri");
        let err = entity
            .upload(&Mesh::triangle(), &VertexLayout::default(), &mut renderer, &registry)
            .unwrap_err();
        assert_eq!(err, BindError::UnknownIdentifier("a_normal".into()));
        assert!(renderer.calls.is_empty());
        assert!(!entity.is_uploaded());
    }

    #[test]
    fn render_binds_model_normal_and_draws() {
        let (mut entity, mut renderer, registry) = uploaded_cube();
        entity.position(Vec3::new(0.0, 0.0, -4.0));
        entity.render(&mut renderer, &registry).unwrap();

        assert_eq!(renderer.draws(), vec![36]);
        let model = renderer.matrices_at(UniformLocation(4));
        assert_eq!(model, vec![Mat4::translation(Vec3::new(0.0, 0.0, -4.0))]);
        assert!(renderer
            .calls
            .iter()
            .any(|c| matches!(c, Call::Matrix3(UniformLocation(5), _))));
    }

    #[test]
    fn render_without_upload_fails() {
        let mut entity = Entity::new("ghost");
        let mut renderer = RecordingRenderer::default();
        let err = entity.render(&mut renderer, &registry()).unwrap_err();
        assert_eq!(err, RenderError::Bind(BindError::NotUploaded("ghost".into())));
    }

    #[test]
    fn normal_uniform_is_optional() {
        let src = "in vec3 a_pos;\nuniform mat4 u_model;\n";
        let mut next = 0;
        let registry = ShaderRegistry::from_source(src, |q, _| {
            next += 1;
            Some(if q == Qualifier::In { 0 } else { next })
        })
        .unwrap();
        let mut renderer = RecordingRenderer::default();
        let mut entity = Entity::new("tri");
        let layout = VertexLayout::new(vec![crate::mesh::VertexAttribute::new(
            "a_pos",
            crate::mesh::AttributeKind::Position,
        )]);
        entity
            .upload(&Mesh::triangle(), &layout, &mut renderer, &registry)
            .unwrap();
        entity.render(&mut renderer, &registry).unwrap();
        assert!(!renderer.calls.iter().any(|c| matches!(c, Call::Matrix3(..))));
        assert_eq!(entity.normal_matrix_version(), None);
    }

    #[test]
    fn zero_scale_is_reported_as_singular() {
        let (mut entity, mut renderer, registry) = uploaded_cube();
        entity.shrink(10.0);
        let err = entity.render(&mut renderer, &registry).unwrap_err();
        assert!(matches!(err, RenderError::Math(MathError::SingularMatrix { .. })));
        assert!(renderer.draws().is_empty());
    }

    #[test]
    fn normal_matrix_is_cached_per_version() {
        let mut entity = Entity::new("e");
        entity.orient(30.0, 0.0, 0.0);
        let v = entity.transform().version();

        let first = entity.normal_matrix().unwrap();
        assert_eq!(entity.normal_matrix_version(), Some(v));
        assert_eq!(entity.normal_matrix().unwrap(), first);

        entity.set_scale(2.0);
        let scaled = entity.normal_matrix().unwrap();
        assert_eq!(entity.normal_matrix_version(), Some(v + 1));
        assert_ne!(scaled, first);
    }

    #[test]
    fn update_applies_spin_over_time() {
        let mut entity = Entity::new("spinner").with_motion(Motion::spin(90.0, 0.0, 0.0));
        entity.update(Duration::from_millis(500));
        let (yaw, _, _) = entity.transform().orientation();
        assert_relative_eq!(yaw, 45.0, epsilon = 1e-4);

        entity.update(Duration::from_secs(7));
        let (yaw, _, _) = entity.transform().orientation();
        assert_relative_eq!(yaw, 315.0, epsilon = 1e-3);
    }

    #[test]
    fn still_entities_stay_clean() {
        let mut entity = Entity::new("rock");
        entity.update(Duration::from_secs(1));
        assert_eq!(entity.transform().version(), 0);
    }

    #[test]
    fn velocity_translates() {
        let mut entity = Entity::new("drift").with_motion(Motion {
            spin: Vec3::ZERO,
            velocity: Vec3::new(0.0, 0.0, -2.0),
        });
        entity.update(Duration::from_millis(250));
        assert_relative_eq!(entity.transform().get_position(), Vec3::new(0.0, 0.0, -0.5));
    }
}
