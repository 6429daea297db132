use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an object in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines and listings.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Local placement of a scene object.
///
/// `rotation` holds Euler angles in radians applied in XYZ order, so the
/// animation can drive individual axes directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Local-to-parent matrix: translate * rotate * scale.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}

pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_uniqueness() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Vec3::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
        assert!(t.matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn translation_lands_in_last_column() {
        let t = Transform::from_position(Vec3::new(1.0, -2.0, 3.0));
        let p = t.matrix().transform_point3(Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(1.0, -2.0, 3.0), 1e-6));
    }

    #[test]
    fn yaw_quarter_turn_maps_x_to_minus_z() {
        let t = Transform {
            rotation: Vec3::new(0.0, deg_to_rad(90.0), 0.0),
            ..Transform::default()
        };
        let v = t.matrix().transform_vector3(Vec3::X);
        assert!(v.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn degrees_to_radians() {
        assert!((deg_to_rad(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert!((deg_to_rad(45.0) - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }
}
