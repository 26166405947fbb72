//! Per-entity transform state with change tracking.
//!
//! [`TransformState`] holds position, Euler orientation (degrees) and a scalar
//! scale. Every mutator eagerly rebuilds the partial matrix for its own channel
//! and marks the state dirty; the combined model matrix is rebuilt only when it
//! is read. A monotonically increasing [`version`](TransformState::version) lets
//! derived values (e.g. a cached normal matrix) detect changes without
//! subscribing to anything.

use log::trace;

use crate::math::{
    mat4::{wrap_degrees, Mat4},
    vec3::Vec3,
};

/// Position, orientation and scale of one entity.
///
/// The fluent mutators return `&mut Self` for chaining:
///
/// ```
/// use meshwork::math::vec3::Vec3;
/// use meshwork::transform::TransformState;
///
/// let mut t = TransformState::new();
/// t.position(Vec3::new(0.0, 0.0, -5.0)).orient(45.0, 0.0, 0.0).set_scale(0.5);
/// assert!(t.is_dirty());
/// let _model = t.model();
/// assert!(!t.is_dirty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TransformState {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    roll: f32,
    scale: f32,

    translation: Mat4,
    rotation: Mat4,
    scaling: Mat4,
    model: Mat4,

    dirty: bool,
    version: u64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            scale: 1.0,
            translation: Mat4::IDENTITY,
            rotation: Mat4::IDENTITY,
            scaling: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            dirty: false,
            version: 0,
        }
    }
}

impl TransformState {
    /// Origin, no rotation, unit scale. Starts clean with an identity model.
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Position ============

    pub fn get_position(&self) -> Vec3 {
        self.position
    }

    /// Move to an absolute position.
    pub fn position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self.translation = Mat4::translation(position);
        self.touch()
    }

    /// Move by `delta`.
    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.position(self.position + delta)
    }

    // ============ Rotation ============

    /// `(yaw, pitch, roll)` in degrees, each in `[0, 360)`.
    pub fn orientation(&self) -> (f32, f32, f32) {
        (self.yaw, self.pitch, self.roll)
    }

    /// Set an absolute orientation in degrees.
    pub fn orient(&mut self, yaw: f32, pitch: f32, roll: f32) -> &mut Self {
        self.yaw = wrap_degrees(yaw);
        self.pitch = wrap_degrees(pitch);
        self.roll = wrap_degrees(roll);
        self.rotation = Mat4::rotation(self.yaw, self.pitch, self.roll);
        self.touch()
    }

    /// Add to the current orientation, in degrees.
    pub fn rotate(&mut self, dyaw: f32, dpitch: f32, droll: f32) -> &mut Self {
        self.orient(self.yaw + dyaw, self.pitch + dpitch, self.roll + droll)
    }

    // ============ Scale ============

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) -> &mut Self {
        self.scale = scale;
        self.scaling = Mat4::scaling(scale);
        self.touch()
    }

    /// Increase the scale. Unbounded.
    pub fn grow(&mut self, sum: f32) -> &mut Self {
        self.set_scale(self.scale + sum)
    }

    /// Decrease the scale, stopping at zero.
    pub fn shrink(&mut self, diff: f32) -> &mut Self {
        self.set_scale((self.scale - diff).max(0.0))
    }

    // ============ Matrices ============

    pub fn translation_matrix(&self) -> &Mat4 {
        &self.translation
    }

    pub fn rotation_matrix(&self) -> &Mat4 {
        &self.rotation
    }

    pub fn scaling_matrix(&self) -> &Mat4 {
        &self.scaling
    }

    /// The model matrix, recomputed first if any channel changed.
    ///
    /// Storage product `rotation * translation * scaling`: a vertex is rotated
    /// about the origin, then moved, then scaled.
    pub fn model(&mut self) -> Mat4 {
        if self.dirty {
            self.model = Mat4::multiply3(self.rotation, self.translation, self.scaling);
            self.dirty = false;
            trace!("model matrix rebuilt at version {}", self.version);
        }
        self.model
    }

    /// Whether the cached model matrix is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bumped by every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) -> &mut Self {
        self.dirty = true;
        self.version += 1;
        self
    }
}
