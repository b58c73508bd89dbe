//! # convergent
//!
//! Runs one flocking discussion against an OpenAI-compatible endpoint and
//! prints every event as one JSON object per line on stdout.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use convergent_core::{setup_logging, OpenAiClient, Preset, SimConfig, SimEvent, Simulation};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Flocking multi-agent discussion simulator
#[derive(Parser)]
#[command(name = "convergent")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON configuration file (camelCase keys, every field optional)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Named preset applied on top of the config
    #[arg(short, long)]
    preset: Option<String>,

    /// Discussion goal
    #[arg(short, long)]
    goal: Option<String>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Number of turns
    #[arg(long)]
    turns: Option<u32>,

    /// Embed replies and report mean similarity
    #[arg(long)]
    embed: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CONVERGENT_LOG", default_value = "info")]
    log_level: String,
}

fn build_config(cli: &Cli) -> Result<SimConfig> {
    let mut cfg = match &cli.config {
        Some(path) => SimConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(id) = &cli.preset {
        let preset = Preset::from_id(id).ok_or_else(|| {
            let known: Vec<&str> = Preset::ALL.iter().map(|p| p.id()).collect();
            anyhow!("unknown preset '{}' (known: {})", id, known.join(", "))
        })?;
        cfg = cfg.with_preset(preset);
    }
    if let Some(goal) = &cli.goal {
        cfg.goal = goal.clone();
    }
    if cli.seed.is_some() {
        cfg.seed = cli.seed;
    }
    if let Some(turns) = cli.turns {
        cfg.max_turns = turns;
    }
    Ok(cfg.clamped())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(Some(cli.log_level.clone()));

    let cfg = build_config(&cli)?;
    let client = Arc::new(OpenAiClient::from_env(&cfg.model)?);

    let mut sim = Simulation::new(cfg, client.clone());
    if cli.embed {
        sim = sim.with_embedder(client);
    }

    let mut handle = sim.spawn(64);
    while let Some(event) = handle.events.recv().await {
        println!("{}", serde_json::to_string(&event)?);
        if let SimEvent::Telemetry { turn, consensus, .. } = &event {
            info!("Turn {} done, {} cluster(s) in consensus", turn, consensus.len());
        }
        if event.is_terminal() {
            break;
        }
    }

    match handle.task.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(anyhow!("simulation task died: {}", e)),
    }
}
