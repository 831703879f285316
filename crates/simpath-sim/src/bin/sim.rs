#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use simpath_sim::{CampaignConfig, load_campaign_config, replay_seed, run_campaign};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Check CELF++ against naive greedy on random influence graphs",
    long_about = None
)]
struct Args {
    /// TOML campaign config; defaults apply when omitted.
    config: Option<PathBuf>,

    /// Re-run a single seed and print both selections.
    #[arg(long, value_name = "SEED")]
    replay: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = match &args.config {
        Some(path) => load_campaign_config(path)?,
        None => CampaignConfig::default(),
    };

    if let Some(seed) = args.replay {
        let trace = replay_seed(seed, &config)?;
        let violations = trace.violation_messages();
        let out = serde_json::json!({
            "seed": seed,
            "graph_hash": trace.graph.content_hash(),
            "lazy": trace.lazy,
            "naive": trace.naive,
            "violations": violations,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        if !violations.is_empty() {
            anyhow::bail!("seed {seed} violated {} invariant(s)", violations.len());
        }
        return Ok(());
    }

    let report = run_campaign(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.all_passed() {
        anyhow::bail!(
            "{} of {} seeds failed (first: {:?})",
            report.failures.len(),
            report.seeds_run,
            report.first_failure
        );
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SIMPATH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "simpath=debug,info"
        } else {
            "simpath=info,warn"
        })
    });

    let format = env::var("SIMPATH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init();
        }
    }
}
