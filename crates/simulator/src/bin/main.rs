//! Broker Simulator CLI
//!
//! Runs a deterministic randomness-broker simulation and prints a report.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use vrfbroker_simulator::{Simulator, SimulatorConfig};

#[derive(Parser)]
#[command(name = "vrfbroker-sim")]
#[command(about = "Deterministic simulator for the randomness broker")]
#[command(version)]
struct Cli {
    /// TOML config file; defaults are used for anything it omits
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Blocks to produce with workload (overrides the config file)
    #[arg(long)]
    blocks: Option<u64>,

    /// Requests per block (overrides the config file)
    #[arg(long)]
    requests_per_block: Option<u32>,

    /// Confirmation depth (overrides the config file)
    #[arg(long)]
    confirmations: Option<u16>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimulatorConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulatorConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(blocks) = cli.blocks {
        config.blocks = blocks;
    }
    if let Some(requests) = cli.requests_per_block {
        config.workload.requests_per_block = requests;
    }
    if let Some(confirmations) = cli.confirmations {
        config.broker.confirmations = confirmations;
    }

    let report = Simulator::new(config)
        .context("setting up simulation")?
        .run()
        .context("running simulation")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }

    Ok(())
}
