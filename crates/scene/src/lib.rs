//! Scene: what is in the world and how it moves.
//!
//! Builds the scene graph (cube, ground, lights, camera) from a
//! [`SceneConfig`] and advances it once per frame with [`Scene::tick`].
//!
//! # Invariants
//! - The tick is a pure function of elapsed time and the wander RNG state.
//! - Renderers read the scene; only the tick and explicit setters mutate it.

pub mod camera;
pub mod clock;
pub mod config;
pub mod error;
pub mod graph;
pub mod lights;
pub mod scene;
pub mod wander;

pub use camera::{PerspectiveCamera, look_at};
pub use clock::Clock;
pub use config::SceneConfig;
pub use error::SceneError;
pub use graph::{Geometry, Material, Node, NodeKind, SceneGraph};
pub use lights::{AmbientLight, DirectionalLight, OrthoShadow, SpotLight, SpotShadow};
pub use scene::{Scene, TickReport};
pub use wander::{Wander, WanderStep};

/// Seed derived from the wall clock, for runs that did not ask for one.
pub fn seed_from_clock() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed)
}

/// Seed for a run: the command line wins, then `wander.seed`, then the clock.
pub fn resolve_seed(cli: Option<u64>, config: &SceneConfig) -> u64 {
    cli.or(config.wander.seed).unwrap_or_else(seed_from_clock)
}

pub fn crate_info() -> &'static str {
    "cubelight-scene v0.1.0"
}
