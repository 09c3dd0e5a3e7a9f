//! Strider CLI - run headless locomotion simulations

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use strider::config::LocomotionConfig;
use strider::script::InputScript;
use strider::sim::{Simulation, SimulationSettings};

#[derive(Parser)]
#[command(name = "strider")]
#[command(about = "First-person locomotion controller", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless simulation and print a JSON summary
    Run {
        /// Locomotion config (TOML). Defaults apply when omitted.
        #[arg(short, long, env = "STRIDER_CONFIG")]
        config: Option<PathBuf>,
        /// Input script (TOML). The built-in demo runs when omitted.
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// Simulated seconds
        #[arg(long, default_value = "5")]
        seconds: f32,
        /// Frame ticks per second
        #[arg(long, default_value = "60")]
        fps: f32,
        /// Fixed physics ticks per second
        #[arg(long, default_value = "50")]
        physics_hz: f32,
    },
    /// Validate a locomotion config file
    CheckConfig {
        path: PathBuf,
    },
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "strider=debug" } else { "strider=info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Run {
            config,
            script,
            seconds,
            fps,
            physics_hz,
        } => run(config, script, seconds, fps, physics_hz),
        Commands::CheckConfig { path } => check_config(path),
    }
}

fn run(
    config: Option<PathBuf>,
    script: Option<PathBuf>,
    seconds: f32,
    fps: f32,
    physics_hz: f32,
) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => LocomotionConfig::from_file(&path)?,
        None => LocomotionConfig::default(),
    };
    let script = match script {
        Some(path) => InputScript::from_file(&path)?,
        None => InputScript::demo(),
    };

    let settings = SimulationSettings {
        physics_rate: physics_hz,
        ..SimulationSettings::default()
    };
    let mut sim = Simulation::new(config, script, settings)?;
    tracing::info!(seconds, fps, physics_hz, "simulation started");

    let report = sim.run(seconds, fps)?;
    tracing::info!(
        frames = report.frames,
        physics_steps = report.physics_steps,
        jumps = report.jumps,
        "simulation finished"
    );
    sim.shutdown();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn check_config(path: PathBuf) -> anyhow::Result<()> {
    let config = LocomotionConfig::from_file(&path)
        .with_context(|| format!("{} is not a valid locomotion config", path.display()))?;
    tracing::info!(?config, "config ok");
    println!("{}: ok", path.display());
    Ok(())
}
