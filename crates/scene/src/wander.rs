use cubelight_common::SplitMix64;
use glam::Vec3;
use serde::Serialize;

/// Drifts a point toward a random target and picks a new one on arrival.
///
/// Each [`step`](Wander::step) covers `lerp_factor` of the remaining
/// distance, so the motion eases out. Once closer than `arrive_threshold` a
/// fresh target is drawn uniformly from the square of side `plane_size`
/// centred on the origin at y = 0.
#[derive(Debug, Clone)]
pub struct Wander {
    current: Vec3,
    target: Vec3,
    pub lerp_factor: f32,
    pub arrive_threshold: f32,
    pub plane_size: f32,
    rng: SplitMix64,
    retargets: u64,
}

/// Result of one wander step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WanderStep {
    pub position: Vec3,
    pub target: Vec3,
    /// Distance left to the target this step moved toward.
    pub distance: f32,
    pub retargeted: bool,
}

impl Wander {
    /// Start at `start` with a first target drawn from `seed`.
    pub fn new(
        start: Vec3,
        plane_size: f32,
        lerp_factor: f32,
        arrive_threshold: f32,
        seed: u64,
    ) -> Self {
        let mut rng = SplitMix64::new(seed);
        let target = random_target(&mut rng, plane_size);
        Self {
            current: start,
            target,
            lerp_factor,
            arrive_threshold,
            plane_size,
            rng,
            retargets: 0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.current
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// How many times a new target has been drawn (the initial one excluded).
    pub fn retargets(&self) -> u64 {
        self.retargets
    }

    pub fn step(&mut self) -> WanderStep {
        self.current = self.current.lerp(self.target, self.lerp_factor);
        let distance = self.current.distance(self.target);
        let reached = self.target;
        let retargeted = distance < self.arrive_threshold;
        if retargeted {
            self.target = random_target(&mut self.rng, self.plane_size);
            self.retargets += 1;
            tracing::debug!(
                "spotlight reached ({:.2}, {:.2}), next target ({:.2}, {:.2})",
                reached.x,
                reached.z,
                self.target.x,
                self.target.z
            );
        }
        WanderStep {
            position: self.current,
            target: self.target,
            distance,
            retargeted,
        }
    }
}

fn random_target(rng: &mut SplitMix64, plane_size: f32) -> Vec3 {
    let x = (rng.next_f32() - 0.5) * plane_size;
    let z = (rng.next_f32() - 0.5) * plane_size;
    Vec3::new(x, 0.0, z)
}
