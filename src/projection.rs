//! Camera projection and view matrices.
//!
//! [`CameraParams`] is the single source of truth for the projection
//! parameters. [`Camera`] rebuilds its projection matrix lazily, only after one
//! of them changed, and binds projection and view to `u_proj` / `u_view`.

use log::{trace, warn};

use crate::error::BindError;
use crate::math::{mat4::Mat4, vec3::Vec3};
use crate::render::{Renderer, ShaderRegistry};

/// Perspective parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Width divided by height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov: 90.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Perspective,
    /// Box projection; the half extents are `width * aspect` and
    /// `height * aspect`.
    Orthographic { width: f32, height: f32 },
}

/// A viewer with projection parameters, a position and an orthonormal basis.
#[derive(Debug, Clone)]
pub struct Camera {
    params: CameraParams,
    mode: ProjectionMode,
    projection: Mat4,
    projection_dirty: bool,

    position: Vec3,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraParams::default())
    }
}

impl Camera {
    pub fn new(params: CameraParams) -> Self {
        Self {
            params,
            mode: ProjectionMode::Perspective,
            projection: Mat4::IDENTITY,
            projection_dirty: true,
            position: Vec3::ZERO,
            right: Vec3::RIGHT,
            up: Vec3::UP,
            forward: Vec3::FORWARD,
        }
    }

    pub fn params(&self) -> CameraParams {
        self.params
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    // ============ Projection Parameters ============

    pub fn set_fov(&mut self, fov: f32) -> &mut Self {
        self.params.fov = fov;
        self.invalidate()
    }

    pub fn set_aspect(&mut self, aspect: f32) -> &mut Self {
        self.params.aspect = aspect;
        self.invalidate()
    }

    /// Derive the aspect ratio from a viewport size in pixels. A zero height is
    /// ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> &mut Self {
        if height == 0 {
            warn!("ignoring viewport with zero height ({width}x{height})");
            return self;
        }
        self.set_aspect(width as f32 / height as f32)
    }

    pub fn set_near(&mut self, near: f32) -> &mut Self {
        self.params.near = near;
        self.invalidate()
    }

    pub fn set_far(&mut self, far: f32) -> &mut Self {
        self.params.far = far;
        self.invalidate()
    }

    pub fn set_mode(&mut self, mode: ProjectionMode) -> &mut Self {
        self.mode = mode;
        self.invalidate()
    }

    /// The projection matrix, rebuilt first if a parameter changed.
    ///
    /// `near >= far` is not rejected; the result is a degenerate matrix.
    pub fn projection(&mut self) -> Mat4 {
        if self.projection_dirty {
            let CameraParams {
                fov,
                aspect,
                near,
                far,
            } = self.params;
            if near >= far {
                warn!("degenerate projection: near {near} >= far {far}");
            }
            self.projection = match self.mode {
                ProjectionMode::Perspective => Mat4::perspective(fov, aspect, near, far),
                ProjectionMode::Orthographic { width, height } => {
                    Mat4::orthographic(width, height, aspect, near, far)
                }
            };
            self.projection_dirty = false;
            trace!("projection rebuilt: {:?}", self.params);
        }
        self.projection
    }

    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty
    }

    fn invalidate(&mut self) -> &mut Self {
        self.projection_dirty = true;
        self
    }

    // ============ View ============

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self
    }

    /// Replace the camera basis. The vectors are normalized.
    pub fn set_basis(&mut self, right: Vec3, up: Vec3, forward: Vec3) -> &mut Self {
        self.right = right.normalize();
        self.up = up.normalize();
        self.forward = forward.normalize();
        self
    }

    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.right, self.up, self.forward)
    }

    /// Basis columns with the camera position as the translation column.
    pub fn view(&self) -> Mat4 {
        Mat4::view(self.right, self.up, self.forward, self.position)
    }

    /// Bind `u_proj` and `u_view`.
    pub fn bind(
        &mut self,
        renderer: &mut dyn Renderer,
        registry: &ShaderRegistry,
    ) -> Result<(), BindError> {
        let projection = self.projection();
        registry.bind_matrix(renderer, "u_proj", &projection)?;
        registry.bind_matrix(renderer, "u_view", &self.view())
    }
}
