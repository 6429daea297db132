use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for cubelight")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy and tests
    Check,
    Fmt,
    Clippy,
    Test,
    /// Run the tick benchmark
    Bench,
    /// Headless smoke run: validate the config and simulate a minute
    Smoke {
        #[arg(long)]
        config: Option<String>,
    },
    /// Launch the desktop viewer
    Run {
        /// Extra arguments passed to cubelight-desktop
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cargo(&["fmt", "--all", "--", "--check"])?;
            cargo(&CLIPPY)?;
            cargo(&["test", "--workspace"])?;
        }
        Commands::Fmt => cargo(&["fmt", "--all", "--", "--check"])?,
        Commands::Clippy => cargo(&CLIPPY)?,
        Commands::Test => cargo(&["test", "--workspace"])?,
        Commands::Bench => cargo(&["bench", "-p", "cubelight-scene"])?,
        Commands::Smoke { config } => {
            let mut check = vec!["run", "-p", "cubelight-cli", "--", "config", "--check"];
            let mut sim = vec![
                "run", "-p", "cubelight-cli", "--", "simulate", "--frames", "3600", "--seed", "1",
            ];
            if let Some(path) = config.as_deref() {
                check.extend(["--config", path]);
                sim.extend(["--config", path]);
            }
            cargo(&check)?;
            cargo(&sim)?;
        }
        Commands::Run { args } => {
            let mut full = vec!["run", "-p", "cubelight-desktop", "--release", "--"];
            full.extend(args.iter().map(String::as_str));
            cargo(&full)?;
        }
    }

    Ok(())
}

const CLIPPY: [&str; 6] = [
    "clippy",
    "--workspace",
    "--all-targets",
    "--",
    "-D",
    "warnings",
];

fn cargo(args: &[&str]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("cargo {} failed", args[0]);
    }
    Ok(())
}
