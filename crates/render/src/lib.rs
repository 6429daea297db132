//! Rendering adapter: everything a backend needs, computed on the CPU.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - [`FrameData`] is derived from the scene and a view, nothing else.
//!
//! The wgpu backend uploads [`MeshData`] once and [`FrameData`] every
//! frame; [`DebugTextRenderer`] prints the same scene for the CLI.

pub mod frame;
pub mod helpers;
pub mod lighting;
pub mod mesh;
mod renderer;

pub use frame::{DrawItem, FrameData, LineVertex};
pub use lighting::{DirectionalData, Lighting, SpotData};
pub use mesh::{MeshData, Vertex};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "cubelight-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
