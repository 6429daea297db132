use glam::{Mat4, Vec3};

/// Perspective camera looking from `position` at `target`.
///
/// Orbit controls move `position` (and pan `target`); resize updates
/// `aspect`. Everything else is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(4.0, 7.0, 7.0),
            target: Vec3::ZERO,
            fov_degrees: 100.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or(Vec3::X)
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    /// Track a new viewport size. A zero height keeps the aspect finite.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        look_at(self.position, self.target)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Right-handed view matrix with Y up, falling back to Z up when the view
/// direction is vertical (a light straight overhead, for instance).
pub fn look_at(eye: Vec3, target: Vec3) -> Mat4 {
    let dir = (target - eye).normalize_or(Vec3::NEG_Z);
    let up = if dir.cross(Vec3::Y).length_squared() < 1e-8 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    Mat4::look_at_rh(eye, target, up)
}
