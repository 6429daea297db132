//! Developer tooling: read-only scene inspection for the desktop overlay
//! and the CLI.

pub mod inspector;

pub use inspector::{NodeInfo, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    "cubelight-tools v0.1.0"
}
