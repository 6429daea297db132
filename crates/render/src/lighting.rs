//! Light data packed for a frame, plus the shading terms the WGSL shader
//! evaluates, mirrored on the CPU.

use cubelight_scene::{DirectionalLight, SpotLight, look_at};
use glam::{Mat4, Vec3};
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalData {
    /// Unit vector the light travels along.
    pub direction: Vec3,
    /// Linear colour times intensity.
    pub radiance: Vec3,
    pub shadow_view_proj: Mat4,
    pub casts_shadow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotData {
    pub position: Vec3,
    pub direction: Vec3,
    pub radiance: Vec3,
    pub distance: f32,
    pub decay: f32,
    pub cos_outer: f32,
    pub cos_inner: f32,
    pub shadow_view_proj: Mat4,
    pub casts_shadow: bool,
}

/// All lights for one frame. One directional and one spot light are
/// supported; ambient lights add up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lighting {
    pub ambient: Vec3,
    pub directional: Option<DirectionalData>,
    pub spot: Option<SpotData>,
}

fn radiance(color: cubelight_common::Color, intensity: f32) -> Vec3 {
    Vec3::from(color.linear()) * intensity
}

impl DirectionalData {
    pub fn new(light: &DirectionalLight, position: Vec3, casts_shadow: bool) -> Self {
        let shadow_view_proj = match light.shadow {
            Some(s) => {
                let e = s.half_extent;
                Mat4::orthographic_rh(-e, e, -e, e, s.near, s.far) * look_at(position, light.target)
            }
            None => Mat4::IDENTITY,
        };
        Self {
            direction: light.direction(position),
            radiance: radiance(light.color, light.intensity),
            shadow_view_proj,
            casts_shadow: casts_shadow && light.shadow.is_some(),
        }
    }
}

impl SpotData {
    pub fn new(light: &SpotLight, position: Vec3, casts_shadow: bool) -> Self {
        let (cos_outer, cos_inner) = light.cone_cosines();
        let near = light.shadow.map(|s| s.near).unwrap_or(0.5);
        let shadow_view_proj =
            Mat4::perspective_rh(light.shadow_fov(), 1.0, near, light.shadow_far())
                * look_at(position, light.target);
        Self {
            position,
            direction: light.direction(position),
            radiance: radiance(light.color, light.intensity),
            distance: light.distance,
            decay: light.decay,
            cos_outer,
            cos_inner,
            shadow_view_proj,
            casts_shadow: casts_shadow && light.shadow.is_some(),
        }
    }

    /// Radiance reaching `point` before the surface term, ignoring shadows.
    pub fn radiance_at(&self, point: Vec3) -> Vec3 {
        let to_point = point - self.position;
        let d = to_point.length();
        if d < 1e-6 {
            return Vec3::ZERO;
        }
        let cos_theta = (to_point / d).dot(self.direction);
        self.radiance
            * cone_factor(cos_theta, self.cos_outer, self.cos_inner)
            * distance_attenuation(d, self.distance, self.decay)
    }
}

/// `d^-decay`, faded to zero at `cutoff` when a range is set.
pub fn distance_attenuation(d: f32, cutoff: f32, decay: f32) -> f32 {
    let mut falloff = 1.0 / d.powf(decay).max(0.01);
    if cutoff > 0.0 {
        let ratio = d / cutoff;
        falloff *= (1.0 - ratio.powi(4)).clamp(0.0, 1.0).powi(2);
    }
    falloff
}

/// Soft cone edge between the outer and inner cosines; a hard step when
/// they coincide.
pub fn cone_factor(cos_theta: f32, cos_outer: f32, cos_inner: f32) -> f32 {
    if cos_inner - cos_outer < 1e-6 {
        return if cos_theta >= cos_outer { 1.0 } else { 0.0 };
    }
    let t = ((cos_theta - cos_outer) / (cos_inner - cos_outer)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Lambert diffuse for a direct light: `albedo / pi * radiance * n.l`.
pub fn lambert(albedo: Vec3, radiance: Vec3, normal: Vec3, to_light: Vec3) -> Vec3 {
    albedo / PI * radiance * normal.dot(to_light).max(0.0)
}

impl Lighting {
    /// Unshadowed diffuse light arriving at `point` on a surface with
    /// `normal`, for a white surface.
    pub fn irradiance_at(&self, point: Vec3, normal: Vec3) -> Vec3 {
        let mut total = self.ambient;
        if let Some(sun) = &self.directional {
            total += lambert(Vec3::ONE, sun.radiance, normal, -sun.direction);
        }
        if let Some(spot) = &self.spot {
            let to_light = (spot.position - point).normalize_or_zero();
            total += lambert(Vec3::ONE, spot.radiance_at(point), normal, to_light);
        }
        total
    }
}
