#![forbid(unsafe_code)]
//! simpath-sim library.
//!
//! Deterministic campaigns that generate random linear-threshold graphs,
//! run the CELF++ and naive greedy selectors on each, and check the results
//! with [`SelectionOracle`](oracle::SelectionOracle).
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod campaign;
pub mod generator;
pub mod oracle;
pub mod rng;

pub use campaign::{
    CampaignConfig, CampaignReport, DetailedTrace, SeedFailure, load_campaign_config,
    replay_seed, run_campaign,
};
pub use generator::{GraphShape, random_graph};
pub use oracle::{InvariantViolation, OracleResult, SelectionOracle};
pub use rng::DeterministicRng;
