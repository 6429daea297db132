//! YAML scene configuration.
//!
//! Every field defaults to the stock scene, so a config file only needs the
//! values it wants to change:
//!
//! ```yaml
//! camera:
//!   fov_degrees: 75
//! spot:
//!   color: "#ff00ff"
//! wander:
//!   seed: 42
//! ```

use crate::error::SceneError;
use cubelight_common::Color;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub renderer: RendererConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub ambient: AmbientConfig,
    pub directional: DirectionalConfig,
    pub spot: SpotConfig,
    pub cube: CubeConfig,
    pub ground: GroundConfig,
    pub wander: WanderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// 1 disables antialiasing, 4 enables 4x MSAA.
    pub msaa_samples: u32,
    pub shadows: bool,
    pub shadow_map_size: u32,
    pub clear_color: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            msaa_samples: 4,
            shadows: true,
            shadow_map_size: 1024,
            clear_color: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 100.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(4.0, 7.0, 7.0),
            target: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Pixels panned per arrow-key press.
    pub key_pan_pixels: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            key_pan_pixels: 7.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalConfig {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub cast_shadow: bool,
    /// Half width of the orthographic shadow frustum.
    pub shadow_extent: f32,
    pub shadow_near: f32,
    pub shadow_far: f32,
    pub show_helper: bool,
    pub helper_size: f32,
    /// Radius of the unlit sphere drawn at the light's position.
    pub marker_radius: f32,
}

impl Default for DirectionalConfig {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: 0.5,
            position: Vec3::new(0.0, 10.0, 0.0),
            target: Vec3::ZERO,
            cast_shadow: true,
            shadow_extent: 5.0,
            shadow_near: 0.5,
            shadow_far: 500.0,
            show_helper: true,
            helper_size: 3.0,
            marker_radius: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotConfig {
    pub color: Color,
    pub intensity: f32,
    /// Range of the light; 0 means unlimited.
    pub distance: f32,
    /// Half-angle of the cone in radians.
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    pub position: Vec3,
    /// Where the light points before the first tick.
    pub target: Vec3,
    pub cast_shadow: bool,
    pub shadow_near: f32,
    pub shadow_far: f32,
    pub shadow_fov_degrees: f32,
    pub show_helper: bool,
}

impl Default for SpotConfig {
    fn default() -> Self {
        Self {
            color: Color(0xffc0cb),
            intensity: 200.0,
            distance: 20.0,
            angle: PI / 10.0,
            penumbra: 0.0,
            decay: 1.5,
            position: Vec3::new(5.0, 7.0, 2.0),
            target: Vec3::new(-90.0, -90.0, 0.0),
            cast_shadow: true,
            shadow_near: 0.5,
            shadow_far: 50.0,
            shadow_fov_degrees: 30.0,
            show_helper: true,
        }
    }
}

/// One colour per cube face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceColors {
    pub right: Color,
    pub left: Color,
    pub top: Color,
    pub bottom: Color,
    pub front: Color,
    pub back: Color,
}

impl Default for FaceColors {
    fn default() -> Self {
        Self {
            right: Color(0xff5500),
            left: Color(0xff0000),
            top: Color(0xffff00),
            bottom: Color(0xffffff),
            front: Color(0x00ff00),
            back: Color(0x0000ff),
        }
    }
}

impl FaceColors {
    /// Colours in box face order: +X, -X, +Y, -Y, +Z, -Z.
    pub fn in_face_order(&self) -> Vec<Color> {
        vec![
            self.right,
            self.left,
            self.top,
            self.bottom,
            self.front,
            self.back,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    pub size: f32,
    pub face_colors: FaceColors,
    pub roughness: f32,
    pub metalness: f32,
    pub show_edges: bool,
    pub edge_color: Color,
    /// Radians per second about both X and Y.
    pub spin_rate: f32,
    pub cast_shadow: bool,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            size: 2.0,
            face_colors: FaceColors::default(),
            roughness: 1.0,
            metalness: 0.0,
            show_edges: true,
            edge_color: Color::BLACK,
            spin_rate: 0.5,
            cast_shadow: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub width: f32,
    pub thickness: f32,
    pub depth: f32,
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub height: f32,
    pub yaw_degrees: f32,
    pub receive_shadow: bool,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            width: 20.0,
            thickness: 0.01,
            depth: 20.0,
            color: Color(0x2e2e2e),
            roughness: 0.2,
            metalness: 0.0,
            height: -2.0,
            yaw_degrees: 45.0,
            receive_shadow: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    /// Side of the square (centred on the origin, y = 0) targets are drawn from.
    pub plane_size: f32,
    /// Fraction of the remaining distance covered each frame.
    pub lerp_factor: f32,
    pub arrive_threshold: f32,
    pub seed: Option<u64>,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            plane_size: 10.0,
            lerp_factor: 0.02,
            arrive_threshold: 0.1,
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Read, parse, and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!("loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SceneError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values that would produce a degenerate camera, light, or tick.
    pub fn validate(&self) -> Result<(), SceneError> {
        let cam = &self.camera;
        for (field, v) in [
            ("camera.position", cam.position),
            ("camera.target", cam.target),
            ("directional.position", self.directional.position),
            ("directional.target", self.directional.target),
            ("spot.position", self.spot.position),
            ("spot.target", self.spot.target),
        ] {
            if !v.is_finite() {
                return Err(SceneError::invalid(field, format!("{v} is not finite")));
            }
        }
        for (field, x) in [
            ("cube.spin_rate", self.cube.spin_rate),
            ("ground.height", self.ground.height),
            ("ground.yaw_degrees", self.ground.yaw_degrees),
        ] {
            if !x.is_finite() {
                return Err(SceneError::invalid(field, format!("{x} is not finite")));
            }
        }
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(SceneError::invalid(
                "camera.fov_degrees",
                format!("{} is outside (0, 180)", cam.fov_degrees),
            ));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(SceneError::invalid(
                "camera.near/far",
                format!("need 0 < near < far, got {} and {}", cam.near, cam.far),
            ));
        }
        if cam.position == cam.target {
            return Err(SceneError::invalid(
                "camera.position",
                "camera sits on its own target",
            ));
        }

        let r = &self.renderer;
        if !matches!(r.msaa_samples, 1 | 4) {
            return Err(SceneError::invalid(
                "renderer.msaa_samples",
                format!("{} is not 1 or 4", r.msaa_samples),
            ));
        }
        if r.shadow_map_size == 0 || r.shadow_map_size > 8192 {
            return Err(SceneError::invalid(
                "renderer.shadow_map_size",
                format!("{} is outside 1..=8192", r.shadow_map_size),
            ));
        }

        let c = &self.controls;
        if !(c.damping_factor > 0.0 && c.damping_factor <= 1.0) {
            return Err(SceneError::invalid(
                "controls.damping_factor",
                format!("{} is outside (0, 1]", c.damping_factor),
            ));
        }
        if !(c.min_distance >= 0.0 && c.max_distance >= c.min_distance) {
            return Err(SceneError::invalid(
                "controls.min_distance/max_distance",
                format!("need 0 <= min <= max, got {} and {}", c.min_distance, c.max_distance),
            ));
        }

        for (field, intensity) in [
            ("ambient.intensity", self.ambient.intensity),
            ("directional.intensity", self.directional.intensity),
            ("spot.intensity", self.spot.intensity),
        ] {
            if !(intensity >= 0.0 && intensity.is_finite()) {
                return Err(SceneError::invalid(field, format!("{intensity} is not a finite value >= 0")));
            }
        }

        let s = &self.spot;
        if !(s.angle > 0.0 && s.angle <= PI / 2.0) {
            return Err(SceneError::invalid(
                "spot.angle",
                format!("{} is outside (0, pi/2]", s.angle),
            ));
        }
        if !(0.0..=1.0).contains(&s.penumbra) {
            return Err(SceneError::invalid(
                "spot.penumbra",
                format!("{} is outside [0, 1]", s.penumbra),
            ));
        }
        if !(s.distance >= 0.0 && s.decay >= 0.0) {
            return Err(SceneError::invalid(
                "spot.distance/decay",
                "must not be negative",
            ));
        }
        if !(s.shadow_near > 0.0 && s.shadow_far > s.shadow_near) {
            return Err(SceneError::invalid(
                "spot.shadow_near/shadow_far",
                format!("need 0 < near < far, got {} and {}", s.shadow_near, s.shadow_far),
            ));
        }

        let d = &self.directional;
        if d.position == d.target {
            return Err(SceneError::invalid(
                "directional.position",
                "light sits on its own target",
            ));
        }
        if !(d.shadow_extent > 0.0 && d.shadow_near >= 0.0 && d.shadow_far > d.shadow_near) {
            return Err(SceneError::invalid(
                "directional.shadow_extent/near/far",
                "need extent > 0 and 0 <= near < far",
            ));
        }

        if !(self.cube.size > 0.0 && self.cube.size.is_finite()) {
            return Err(SceneError::invalid(
                "cube.size",
                format!("{} is not positive", self.cube.size),
            ));
        }
        let g = &self.ground;
        if !(g.width > 0.0 && g.depth > 0.0 && g.thickness > 0.0) {
            return Err(SceneError::invalid(
                "ground.width/thickness/depth",
                "all dimensions must be positive",
            ));
        }

        let w = &self.wander;
        if !(w.lerp_factor > 0.0 && w.lerp_factor <= 1.0) {
            return Err(SceneError::invalid(
                "wander.lerp_factor",
                format!("{} is outside (0, 1]", w.lerp_factor),
            ));
        }
        if !(w.arrive_threshold > 0.0 && w.arrive_threshold.is_finite()) {
            return Err(SceneError::invalid(
                "wander.arrive_threshold",
                format!("{} is not positive", w.arrive_threshold),
            ));
        }
        if !(w.plane_size > 0.0 && w.plane_size.is_finite()) {
            return Err(SceneError::invalid(
                "wander.plane_size",
                format!("{} is not positive", w.plane_size),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_stock_scene() {
        let c = SceneConfig::default();
        assert_eq!(c.camera.fov_degrees, 100.0);
        assert_eq!(c.camera.position, Vec3::new(4.0, 7.0, 7.0));
        assert_eq!(c.ambient.intensity, 0.3);
        assert_eq!(c.directional.intensity, 0.5);
        assert_eq!(c.spot.intensity, 200.0);
        assert_eq!(c.spot.color, Color(0xffc0cb));
        assert_eq!(c.ground.color, Color(0x2e2e2e));
        assert_eq!(c.wander.lerp_factor, 0.02);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let c = SceneConfig::from_yaml_str(
            "camera:\n  fov_degrees: 75\nspot:\n  color: \"#ff00ff\"\nwander:\n  seed: 9\n",
        )
        .unwrap();
        assert_eq!(c.camera.fov_degrees, 75.0);
        assert_eq!(c.camera.near, 0.1);
        assert_eq!(c.spot.color, Color(0xff00ff));
        assert_eq!(c.spot.intensity, 200.0);
        assert_eq!(c.wander.seed, Some(9));
    }

    #[test]
    fn empty_document_is_default() {
        let c = SceneConfig::from_yaml_str("{}").unwrap();
        assert_eq!(c, SceneConfig::default());
    }

    #[test]
    fn yaml_round_trip() {
        let original = SceneConfig::default();
        let text = original.to_yaml().unwrap();
        assert!(text.contains("#ffc0cb"));
        let back = SceneConfig::from_yaml_str(&text).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn bad_colour_is_a_yaml_error() {
        let err = SceneConfig::from_yaml_str("ambient:\n  color: chartreuse-ish\n").unwrap_err();
        assert!(matches!(err, SceneError::Yaml(_)));
    }

    #[test]
    fn rejects_bad_fov() {
        let mut c = SceneConfig::default();
        c.camera.fov_degrees = 180.0;
        let err = c.validate().unwrap_err();
        assert!(matches!(err, SceneError::Invalid { field: "camera.fov_degrees", .. }));
    }

    #[test]
    fn rejects_inverted_clip_planes() {
        let mut c = SceneConfig::default();
        c.camera.far = 0.05;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_bad_lerp_and_threshold() {
        let mut c = SceneConfig::default();
        c.wander.lerp_factor = 0.0;
        assert!(c.validate().is_err());

        let mut c = SceneConfig::default();
        c.wander.lerp_factor = 1.5;
        assert!(c.validate().is_err());

        let mut c = SceneConfig::default();
        c.wander.arrive_threshold = 0.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_bad_spot_cone() {
        let mut c = SceneConfig::default();
        c.spot.angle = 2.0;
        assert!(c.validate().is_err());

        let mut c = SceneConfig::default();
        c.spot.penumbra = -0.1;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_unsupported_msaa() {
        let mut c = SceneConfig::default();
        c.renderer.msaa_samples = 2;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_negative_intensity() {
        let mut c = SceneConfig::default();
        c.ambient.intensity = -1.0;
        let err = c.validate().unwrap_err();
        assert!(matches!(err, SceneError::Invalid { field: "ambient.intensity", .. }));
    }

    #[test]
    fn face_order_matches_box_faces() {
        let colors = FaceColors::default().in_face_order();
        assert_eq!(colors[0], Color(0xff5500));
        assert_eq!(colors[2], Color(0xffff00));
        assert_eq!(colors[5], Color(0x0000ff));
    }

    #[test]
    fn rejects_nan() {
        for (yaml, field) in [
            ("wander:\n  plane_size: .nan\n", "wander.plane_size"),
            ("wander:\n  arrive_threshold: .nan\n", "wander.arrive_threshold"),
            ("camera:\n  near: .nan\n", "camera.near/far"),
            ("spot:\n  intensity: .nan\n", "spot.intensity"),
            ("spot:\n  distance: .nan\n", "spot.distance/decay"),
            ("cube:\n  size: .nan\n", "cube.size"),
            ("cube:\n  spin_rate: .nan\n", "cube.spin_rate"),
            ("spot:\n  target: [.nan, 0, 0]\n", "spot.target"),
        ] {
            match SceneConfig::from_yaml_str(yaml) {
                Err(SceneError::Invalid { field: got, .. }) => assert_eq!(got, field, "{yaml}"),
                other => panic!("{yaml}: expected Invalid({field}), got {other:?}"),
            }
        }
    }
}
