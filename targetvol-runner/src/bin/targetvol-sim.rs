//! Run one simulation from a TOML config and print the summary as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use targetvol_runner::{init_tracing, run_simulation, RunConfig};

#[derive(Parser)]
#[command(
    name = "targetvol-sim",
    about = "Target-volatility strategy simulator"
)]
struct Cli {
    /// Path to a TOML run configuration.
    config: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = RunConfig::from_toml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let summary = run_simulation(&config).context("simulation failed")?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
