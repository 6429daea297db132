use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use cubelight_render::{DebugTextRenderer, RenderView, Renderer};
use cubelight_scene::{Scene, SceneConfig};
use cubelight_tools::SceneInspector;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubelight-cli", about = "Headless tool for the cubelight scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Scene config (YAML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Print the effective config as YAML
    Config {
        /// Only validate, print nothing on success
        #[arg(long)]
        check: bool,
    },
    /// Run the animation tick headlessly
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "600")]
        frames: u64,
        /// Frames per second used to derive elapsed time
        #[arg(long, default_value = "60")]
        fps: f32,
        /// RNG seed for the spotlight targets
        #[arg(short, long)]
        seed: Option<u64>,
        /// Emit JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// List the scene graph and camera
    Describe {
        /// Frames to advance before describing
        #[arg(short, long, default_value = "0")]
        frames: u64,
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn load_config(path: Option<&Path>) -> Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn build_scene(config: &SceneConfig, seed: Option<u64>) -> Result<Scene> {
    let seed = cubelight_scene::resolve_seed(seed, config);
    Scene::from_config(config, seed).context("failed to build scene")
}

fn simulate(scene: &mut Scene, frames: u64, fps: f32, json: bool) -> Result<()> {
    if fps <= 0.0 {
        bail!("--fps must be positive, got {fps}");
    }
    if !json {
        println!(
            "Simulating {frames} frames at {fps} fps, seed={}",
            scene.seed()
        );
    }

    for frame in 1..=frames {
        let report = scene.tick(frame as f32 / fps);
        if !report.retargeted {
            continue;
        }
        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!(
                "frame {:>6} t={:>8.2}s reached ({:.2}, {:.2}), next ({:.2}, {:.2})",
                report.frame,
                report.elapsed,
                report.spot_target.x,
                report.spot_target.z,
                report.wander_target.x,
                report.wander_target.z
            );
        }
    }

    let summary = SceneInspector::summary(scene);
    if json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("cubelight-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", cubelight_scene::crate_info());
            println!("input: {}", cubelight_input::crate_info());
            println!("render: {}", cubelight_render::crate_info());
            println!("tools: {}", cubelight_tools::crate_info());
        }
        Commands::Config { check } => {
            let config = load_config(cli.config.as_deref())?;
            if check {
                tracing::info!("config ok");
            } else {
                print!("{}", config.to_yaml()?);
            }
        }
        Commands::Simulate {
            frames,
            fps,
            seed,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let mut scene = build_scene(&config, seed)?;
            simulate(&mut scene, frames, fps, json)?;
        }
        Commands::Describe { frames, seed } => {
            let config = load_config(cli.config.as_deref())?;
            let mut scene = build_scene(&config, seed)?;
            for frame in 1..=frames {
                scene.tick(frame as f32 / 60.0);
            }
            let view = RenderView::from_camera(scene.camera());
            print!("{}", DebugTextRenderer::new().render(&scene, &view));
        }
    }

    Ok(())
}
