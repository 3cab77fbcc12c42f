/// Camera — passive view/projection container.
///
/// The camera computes nothing during drawing. The caller sets the view
/// and projection matrices (helpers exist for the common cases) and the
/// device multiplies them with each object's transform at draw time.

use glam::{Mat4, Vec3};

/// A camera holding view and projection matrices.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Create a camera with identity view and projection.
    pub fn new() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }

    /// Create a camera with a perspective projection.
    ///
    /// # Arguments
    ///
    /// * `fov_y` - Vertical field of view, in radians
    /// * `aspect` - Width / height of the target canvas
    /// * `near`, `far` - Clip plane distances
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::perspective_rh(fov_y, aspect, near, far),
        }
    }

    /// View matrix (inverse of the camera's world transform).
    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Projection matrix (perspective or orthographic).
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Set the view matrix.
    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    /// Point the camera at `center` from `eye`.
    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.view = Mat4::look_at_rh(eye, center, up);
    }

    /// Set the projection matrix.
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
