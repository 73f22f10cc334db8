use anyhow::{Context, Result};
use clap::Parser;
use navguard::{App, NavGuardConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "navguard")]
#[command(about = "Predictive velocity-safety filter for mobile robots")]
#[command(version)]
struct Cli {
    /// Config file (TOML or YAML); defaults to ./navguard.toml when present
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Robot model file, overrides the config
    #[arg(short = 'm', long = "model")]
    model: Option<PathBuf>,

    /// Runtime parameter file, overrides the config
    #[arg(short = 'p', long = "params")]
    params: Option<PathBuf>,

    /// Forward every command unchecked
    #[arg(long = "pass-through")]
    pass_through: bool,

    /// Stop after this many seconds
    #[arg(short = 'd', long = "duration-secs", value_name = "SECS")]
    duration_secs: Option<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "navguard=info,navguard_core=info,navguard_library=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => NavGuardConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NavGuardConfig::find_and_load().context("loading config")?,
    };
    if let Some(model) = cli.model {
        config.robot.model_path = Some(model);
    }
    if let Some(params) = cli.params {
        config.params_file = Some(params);
    }

    let duration = match cli.duration_secs {
        Some(secs) if secs.is_finite() && secs > 0.0 => Some(Duration::from_secs_f64(secs)),
        Some(secs) => anyhow::bail!("--duration-secs must be positive, got {}", secs),
        None => None,
    };

    let params = config.build_params().context("loading runtime parameters")?;
    if cli.pass_through {
        params.set("pass_through", true)?;
    }

    let mut app = App::build_with_params(&config, params).context("starting navguard")?;
    app.run(duration).context("running navguard")?;
    Ok(())
}
