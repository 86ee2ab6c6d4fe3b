use glam::{Mat4, Vec3};

/// Perspective camera looking at a target point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Eye position in world space.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// World up direction.
    pub up: Vec3,
    /// Vertical field of view, radians.
    pub fov_y: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    /// Same as [`Camera::default`]: at `(0, 0, 5)` looking at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the eye.
    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    /// Aims at a point.
    pub fn looking_at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.target = Vec3::new(x, y, z);
        self
    }

    /// Sets the vertical field of view in degrees.
    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov_y = fov_degrees.to_radians();
        self
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// World-to-view matrix.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Depth maps to `[0, 1]`.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }

    /// World-to-clip matrix.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene3d/camera.rs"]
mod tests;
