//! wgpu render backend for the cubelight scene.
//!
//! Draws lit meshes with ambient, directional, and spot lighting, soft
//! shadow maps for both direct lights, and world-space line lists for the
//! cube edges and light helpers.
//!
//! # Invariants
//! - Renderer never mutates scene state; it consumes [`cubelight_render::FrameData`].
//! - Meshes are uploaded once at construction; only uniforms, instances,
//!   and lines change per frame.

mod gpu;
mod shaders;

pub use gpu::{RendererSettings, WgpuRenderer};
