use crate::action::Action;
use cubelight_scene::PerspectiveCamera;
use cubelight_scene::config::ControlsConfig;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

const EPS: f32 = 1e-6;
/// Squared distance below which an update counts as no motion.
const MOVE_EPS: f32 = 1e-6;

/// Spherical coordinates around the orbit target, Y up.
///
/// `phi` is measured from +Y, `theta` around Y starting at +Z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius < EPS {
            return Self::default();
        }
        Self {
            radius,
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
            theta: v.x.atan2(v.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Orbit-style camera controls.
///
/// Input accumulates into pending rotation, dolly, and pan deltas;
/// [`update`](OrbitControls::update) applies them once per frame. With
/// damping on, each update applies `damping_factor` of the pending delta and
/// keeps the rest, so the camera glides to a stop after input ends.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub key_pan_pixels: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    viewport_height: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
    saved_position: Vec3,
    saved_target: Vec3,
}

impl OrbitControls {
    /// Attach to `camera`, remembering its pose for [`reset`](Self::reset).
    pub fn new(camera: &PerspectiveCamera, config: &ControlsConfig) -> Self {
        Self {
            target: camera.target,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            key_pan_pixels: config.key_pan_pixels,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            viewport_height: 720.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            saved_position: camera.position,
            saved_target: camera.target,
        }
    }

    /// Feed one action. Non-camera actions other than resize are ignored.
    pub fn apply(&mut self, action: Action, camera: &mut PerspectiveCamera) {
        match action {
            Action::Orbit { dx, dy } => {
                let h = self.viewport_height.max(1.0);
                self.delta_theta -= TAU * dx / h * self.rotate_speed;
                self.delta_phi -= TAU * dy / h * self.rotate_speed;
            }
            Action::Pan { dx, dy } => self.pan(dx, dy, camera),
            Action::Zoom(steps) => {
                self.scale *= 0.95_f32.powf(self.zoom_speed * steps);
            }
            Action::ResetView => self.reset(camera),
            Action::Resize { height, .. } => {
                self.viewport_height = height.max(1) as f32;
            }
            Action::ToggleInspector | Action::Exit | Action::Noop => {}
        }
    }

    fn pan(&mut self, dx: f32, dy: f32, camera: &PerspectiveCamera) {
        let h = self.viewport_height.max(1.0);
        let distance = (camera.position - self.target).length()
            * (camera.fov_degrees.to_radians() / 2.0).tan();
        let left = -camera.right() * (2.0 * dx * distance / h);
        let up = camera.up() * (2.0 * dy * distance / h);
        self.pan_offset += (left + up) * self.pan_speed;
    }

    /// Pan by `key_pan_pixels` in the given screen direction.
    pub fn key_pan(&mut self, right: f32, up: f32, camera: &PerspectiveCamera) {
        let step = self.key_pan_pixels;
        self.pan(-right * step, up * step, camera);
    }

    /// Apply pending motion to `camera`. Returns whether it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let old_position = camera.position;
        let old_target = self.target;

        let mut s = Spherical::from_offset(camera.position - self.target);
        let (fraction, keep) = if self.enable_damping {
            (self.damping_factor, 1.0 - self.damping_factor)
        } else {
            (1.0, 0.0)
        };

        s.theta += self.delta_theta * fraction;
        s.phi += self.delta_phi * fraction;
        s.phi = s.phi.clamp(EPS, PI - EPS);
        s.radius = (s.radius * self.scale)
            .clamp(self.min_distance, self.max_distance)
            .max(EPS);

        self.target += self.pan_offset * fraction;
        camera.position = self.target + s.to_offset();
        camera.target = self.target;

        self.delta_theta *= keep;
        self.delta_phi *= keep;
        self.pan_offset *= keep;
        self.scale = 1.0;

        (camera.position - old_position).length_squared() > MOVE_EPS
            || (self.target - old_target).length_squared() > MOVE_EPS
    }

    /// Restore the pose captured at construction and drop pending motion.
    pub fn reset(&mut self, camera: &mut PerspectiveCamera) {
        self.target = self.saved_target;
        camera.position = self.saved_position;
        camera.target = self.saved_target;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
        tracing::debug!("orbit controls reset");
    }

    /// Distance from the camera to the orbit target.
    pub fn distance(&self, camera: &PerspectiveCamera) -> f32 {
        (camera.position - self.target).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(damping: bool) -> (OrbitControls, PerspectiveCamera) {
        let camera = PerspectiveCamera::default();
        let config = ControlsConfig {
            enable_damping: damping,
            ..ControlsConfig::default()
        };
        let mut controls = OrbitControls::new(&camera, &config);
        let mut camera = camera;
        controls.apply(
            Action::Resize {
                width: 1280,
                height: 720,
            },
            &mut camera,
        );
        (controls, camera)
    }

    #[test]
    fn spherical_round_trip() {
        let v = Vec3::new(4.0, 7.0, 7.0);
        let back = Spherical::from_offset(v).to_offset();
        assert!(back.abs_diff_eq(v, 1e-4), "{back}");
    }

    #[test]
    fn idle_update_does_not_move() {
        let (mut controls, mut camera) = setup(true);
        let start = camera.position;
        assert!(!controls.update(&mut camera));
        assert!(camera.position.abs_diff_eq(start, 1e-4));
    }

    #[test]
    fn orbit_keeps_distance() {
        let (mut controls, mut camera) = setup(false);
        let r = controls.distance(&camera);
        controls.apply(Action::Orbit { dx: 120.0, dy: 0.0 }, &mut camera);
        assert!(controls.update(&mut camera));
        assert!((controls.distance(&camera) - r).abs() < 1e-3);
        // Horizontal drag only changes azimuth, not height.
        assert!((camera.position.y - 7.0).abs() < 1e-3);
    }

    #[test]
    fn full_height_drag_is_a_full_turn() {
        let (mut controls, mut camera) = setup(false);
        let start = camera.position;
        controls.apply(Action::Orbit { dx: 720.0, dy: 0.0 }, &mut camera);
        controls.update(&mut camera);
        assert!(camera.position.abs_diff_eq(start, 1e-3), "{}", camera.position);
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let (mut damped, mut cam_a) = setup(true);
        let (mut instant, mut cam_b) = setup(false);
        let drag = Action::Orbit { dx: 50.0, dy: 0.0 };
        damped.apply(drag, &mut cam_a);
        instant.apply(drag, &mut cam_b);

        damped.update(&mut cam_a);
        instant.update(&mut cam_b);
        assert!(!cam_a.position.abs_diff_eq(cam_b.position, 1e-3));

        // After many frames the damped camera converges on the same spot.
        for _ in 0..400 {
            damped.update(&mut cam_a);
        }
        assert!(cam_a.position.abs_diff_eq(cam_b.position, 1e-3));
        assert!(!damped.update(&mut cam_a));
    }

    #[test]
    fn polar_angle_is_clamped() {
        let (mut controls, mut camera) = setup(false);
        controls.apply(Action::Orbit { dx: 0.0, dy: 5000.0 }, &mut camera);
        controls.update(&mut camera);
        assert!(camera.position.is_finite());
        let offset = camera.position - controls.target;
        assert!(offset.y <= controls.distance(&camera));
        assert!(offset.x.abs() + offset.z.abs() < 1e-3);
    }

    #[test]
    fn zoom_scales_distance() {
        let (mut controls, mut camera) = setup(false);
        let r = controls.distance(&camera);
        controls.apply(Action::Zoom(1.0), &mut camera);
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - r * 0.95).abs() < 1e-3);

        controls.apply(Action::Zoom(-1.0), &mut camera);
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - r).abs() < 1e-3);
    }

    #[test]
    fn distance_limits_hold() {
        let (mut controls, mut camera) = setup(false);
        controls.min_distance = 5.0;
        controls.max_distance = 12.0;
        controls.apply(Action::Zoom(100.0), &mut camera);
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - 5.0).abs() < 1e-3);
        controls.apply(Action::Zoom(-100.0), &mut camera);
        controls.update(&mut camera);
        assert!((controls.distance(&camera) - 12.0).abs() < 1e-3);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let (mut controls, mut camera) = setup(false);
        let offset = camera.position - controls.target;
        controls.apply(Action::Pan { dx: 100.0, dy: 0.0 }, &mut camera);
        assert!(controls.update(&mut camera));
        assert_ne!(controls.target, Vec3::ZERO);
        assert!((camera.position - controls.target).abs_diff_eq(offset, 1e-3));
        // Dragging right slides the target toward the camera's left.
        assert!(controls.target.dot(camera.right()) < 0.0);
    }

    #[test]
    fn key_pan_up_raises_target() {
        let (mut controls, mut camera) = setup(false);
        controls.key_pan(0.0, 1.0, &camera);
        controls.update(&mut camera);
        assert!(controls.target.dot(camera.up()) > 0.0);
    }

    #[test]
    fn reset_restores_pose() {
        let (mut controls, mut camera) = setup(true);
        let start = camera.position;
        controls.apply(Action::Orbit { dx: 300.0, dy: 40.0 }, &mut camera);
        controls.apply(Action::Pan { dx: 10.0, dy: 10.0 }, &mut camera);
        for _ in 0..10 {
            controls.update(&mut camera);
        }
        controls.apply(Action::ResetView, &mut camera);
        assert_eq!(camera.position, start);
        assert_eq!(controls.target, Vec3::ZERO);
        assert!(!controls.update(&mut camera));
    }
}
