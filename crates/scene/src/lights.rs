//! Light parameters. A light's position is its node's world position; the
//! structs here hold everything else.

use cubelight_common::Color;
use glam::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Orthographic shadow frustum for a directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoShadow {
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    /// World-space point the light shines toward.
    pub target: Vec3,
    pub shadow: Option<OrthoShadow>,
}

impl DirectionalLight {
    /// Unit vector from the light toward its target.
    pub fn direction(&self, position: Vec3) -> Vec3 {
        (self.target - position).normalize_or(Vec3::NEG_Y)
    }
}

/// Perspective shadow camera settings for a spotlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotShadow {
    pub near: f32,
    pub far: f32,
    pub fov_degrees: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    pub color: Color,
    pub intensity: f32,
    /// Range; 0 means unlimited.
    pub distance: f32,
    /// Cone half-angle in radians.
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    /// World-space point the cone is aimed at. The wander moves this.
    pub target: Vec3,
    pub shadow: Option<SpotShadow>,
}

impl SpotLight {
    pub fn direction(&self, position: Vec3) -> Vec3 {
        (self.target - position).normalize_or(Vec3::NEG_Y)
    }

    /// Cosines of the outer and inner cone edges. Equal when penumbra is 0.
    pub fn cone_cosines(&self) -> (f32, f32) {
        let outer = self.angle.cos();
        let inner = (self.angle * (1.0 - self.penumbra)).cos();
        (outer, inner)
    }

    /// Vertical fov of the shadow camera in radians.
    ///
    /// The shadow frustum is always fitted to the cone; the configured
    /// `SpotShadow::fov_degrees` is superseded on every frame.
    pub fn shadow_fov(&self) -> f32 {
        (2.0 * self.angle).max(0.01)
    }

    /// Far plane of the shadow camera: the light's range when it has one.
    pub fn shadow_far(&self) -> f32 {
        match (self.distance, self.shadow) {
            (d, _) if d > 0.0 => d,
            (_, Some(s)) => s.far,
            _ => 500.0,
        }
    }
}
