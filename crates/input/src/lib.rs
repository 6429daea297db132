//! Input: raw pointer and key events become [`Action`]s; [`OrbitControls`]
//! turns actions into camera motion.
//!
//! # Invariants
//! - Controls never touch the scene graph, only the camera.
//! - Platform event types stay in the apps; this crate sees plain values.

pub mod action;
pub mod mapping;
pub mod orbit;

pub use action::Action;
pub use mapping::{Key, PointerButton, PointerMapper};
pub use orbit::OrbitControls;

pub fn crate_info() -> &'static str {
    "cubelight-input v0.1.0"
}
