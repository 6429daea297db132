//! Shared types for the cubelight scene.
//!
//! Ids, spatial transforms, colours, and the seeded RNG used by the
//! spotlight wander. No crate in the workspace depends on anything lower.

mod color;
mod rng;
mod types;

pub use color::{Color, ColorParseError};
pub use rng::SplitMix64;
pub use types::{ObjectId, Transform, deg_to_rad};
