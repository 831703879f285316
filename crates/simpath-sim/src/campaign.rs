//! Campaign runner for deterministic selection campaigns.
//!
//! Executes many seeds, each generating a random graph and running both
//! selectors on it, then collects pass/fail results from the oracle and
//! identifies the first failing seed for replay.

use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use simpath_core::{InfluenceGraph, SelectionConfig};
use simpath_select::{SeedSelection, celf_select, greedy_select};
use tracing::{debug, info, instrument};

use crate::generator::{GraphShape, node_label, random_edges};
use crate::oracle::{InvariantViolation, OracleResult, SelectionOracle};
use crate::rng::DeterministicRng;

/// Campaign-level configuration: which seeds to run and what each seed's
/// graph and selection look like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Range of seeds to execute, e.g., `0..50`.
    pub seed_range: Range<u64>,
    pub shape: GraphShape,
    /// Seeds to select per graph.
    pub k: usize,
    /// Estimator settings shared by both selectors.
    pub selection: SelectionConfig,
    /// Shuffled edge-list rebuilds per seed for the order check.
    pub shuffles: usize,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            seed_range: 0..50,
            shape: GraphShape::default(),
            k: 3,
            // Below every generated path probability, so nothing is pruned.
            selection: SelectionConfig::with_tolerance(1e-15),
            shuffles: 2,
        }
    }
}

impl CampaignConfig {
    /// Validate configuration before running.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.seed_range.is_empty() {
            bail!("seed_range must not be empty");
        }
        if self.shape.nodes == 0 {
            bail!("shape.nodes must be > 0");
        }
        if !(self.shape.min_weight > 0.0 && self.shape.min_weight < 1.0) {
            bail!("shape.min_weight must be in (0, 1), got {}", self.shape.min_weight);
        }
        if self.k > self.shape.nodes {
            bail!("k ({}) must not exceed shape.nodes ({})", self.k, self.shape.nodes);
        }
        self.selection
            .validate()
            .context("invalid selection settings")?;
        Ok(())
    }
}

/// Load a campaign config from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_campaign_config(path: &Path) -> Result<CampaignConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read campaign config {}", path.display()))?;
    let config: CampaignConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse campaign config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Failure details for a single seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedFailure {
    pub seed: u64,
    /// Invariant violations found.
    pub violations: Vec<String>,
}

/// Aggregate report produced by a campaign run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub seeds_run: usize,
    pub seeds_passed: usize,
    /// First seed that failed (for prioritized replay).
    pub first_failure: Option<u64>,
    pub failures: Vec<SeedFailure>,
    /// Marginal-gain evaluations by the lazy selector, summed over seeds.
    pub lazy_evaluations: usize,
    /// Marginal-gain evaluations by naive greedy, summed over seeds.
    pub naive_evaluations: usize,
    /// Revalidations served from `mg2`, summed over seeds.
    pub mg2_reuses: usize,
}

impl CampaignReport {
    /// True if every seed passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Everything produced by one seed.
#[derive(Debug, Clone)]
pub struct DetailedTrace {
    pub graph: InfluenceGraph,
    pub lazy: SeedSelection,
    pub naive: SeedSelection,
    pub oracle: OracleResult,
}

impl DetailedTrace {
    /// Oracle violations rendered as one line each.
    #[must_use]
    pub fn violation_messages(&self) -> Vec<String> {
        self.oracle.violations.iter().map(format_violation).collect()
    }
}

/// Run a full campaign across all seeds in the config.
///
/// # Errors
///
/// Returns an error if config validation fails or a selector fails on a
/// generated graph.
#[instrument(skip(config), fields(seeds = ?config.seed_range))]
pub fn run_campaign(config: &CampaignConfig) -> Result<CampaignReport> {
    config.validate()?;

    let mut report = CampaignReport {
        seeds_run: 0,
        seeds_passed: 0,
        first_failure: None,
        failures: Vec::new(),
        lazy_evaluations: 0,
        naive_evaluations: 0,
        mg2_reuses: 0,
    };

    for seed in config.seed_range.clone() {
        report.seeds_run += 1;
        let trace = run_seed(seed, config)?;

        report.lazy_evaluations += trace.lazy.stats.gain_evaluations;
        report.naive_evaluations += trace.naive.stats.gain_evaluations;
        report.mg2_reuses += trace.lazy.stats.mg2_reuses;

        if trace.oracle.passed {
            report.seeds_passed += 1;
        } else {
            report.first_failure.get_or_insert(seed);
            report.failures.push(SeedFailure {
                seed,
                violations: trace.violation_messages(),
            });
        }
    }

    info!(
        seeds_run = report.seeds_run,
        seeds_passed = report.seeds_passed,
        lazy_evaluations = report.lazy_evaluations,
        naive_evaluations = report.naive_evaluations,
        "campaign finished"
    );
    Ok(report)
}

/// Replay a single seed with full details for debugging.
///
/// # Errors
///
/// Returns an error when config validation or selection fails.
pub fn replay_seed(seed: u64, config: &CampaignConfig) -> Result<DetailedTrace> {
    config.validate()?;
    run_seed(seed, config)
}

fn run_seed(seed: u64, config: &CampaignConfig) -> Result<DetailedTrace> {
    let mut rng = DeterministicRng::new(seed);
    let edges = random_edges(&config.shape, &mut rng);
    let graph = InfluenceGraph::from_parts((0..config.shape.nodes).map(node_label), edges.clone())
        .with_context(|| format!("seed {seed}: generated graph failed validation"))?;

    let lazy = celf_select(&graph, &config.selection, config.k, None)
        .with_context(|| format!("seed {seed}: celf++ selection failed"))?;
    let naive = greedy_select(&graph, &config.selection, config.k, None)
        .with_context(|| format!("seed {seed}: greedy selection failed"))?;
    debug!(seed, edges = graph.edge_count(), seeds = ?lazy.seeds, "seed selected");

    let mut oracle_rng = DeterministicRng::new(seed.wrapping_add(0xDEAD));
    let oracle = SelectionOracle::check_all(
        &graph,
        &edges,
        &config.selection,
        &lazy,
        &naive,
        &mut oracle_rng,
        config.shuffles,
    );

    Ok(DetailedTrace {
        graph,
        lazy,
        naive,
        oracle,
    })
}

/// Format an invariant violation into a human-readable string.
fn format_violation(v: &InvariantViolation) -> String {
    match v {
        InvariantViolation::Equivalence { lazy, naive } => {
            format!("Equivalence: celf++ chose {lazy:?}, greedy chose {naive:?}")
        }
        InvariantViolation::GainIncrease {
            round,
            previous,
            next,
        } => format!("GainIncrease: round {round} gain {next:.6} > previous {previous:.6}"),
        InvariantViolation::SpreadMismatch {
            reported,
            recomputed,
        } => format!("SpreadMismatch: reported {reported:.6}, recomputed {recomputed:.6}"),
        InvariantViolation::GainSum { sum, spread } => {
            format!("GainSum: gains add to {sum:.6}, spread is {spread:.6}")
        }
        InvariantViolation::SpreadOutOfBounds {
            spread,
            seeds,
            nodes,
        } => format!("SpreadOutOfBounds: {spread:.6} outside [{seeds}, {nodes}]"),
        InvariantViolation::DuplicateSeed { seed } => format!("DuplicateSeed: {seed}"),
        InvariantViolation::GraphHashMismatch { expected, actual } => {
            format!("GraphHashMismatch: expected {expected}, got {actual}")
        }
        InvariantViolation::OrderSensitivity {
            permutation_index,
            expected,
            actual,
        } => format!(
            "OrderSensitivity: permutation {permutation_index} chose {actual:?} not {expected:?}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_config_default_is_valid() {
        assert!(CampaignConfig::default().validate().is_ok());
    }

    #[test]
    fn campaign_config_empty_seed_range_rejected() {
        let config = CampaignConfig {
            seed_range: 5..5,
            ..CampaignConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn campaign_config_k_above_nodes_rejected() {
        let config = CampaignConfig {
            k: 20,
            ..CampaignConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn campaign_config_bad_tolerance_rejected() {
        let config = CampaignConfig {
            selection: SelectionConfig::with_tolerance(2.0),
            ..CampaignConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn replay_is_deterministic() {
        let config = CampaignConfig::default();
        let a = replay_seed(7, &config).expect("replay");
        let b = replay_seed(7, &config).expect("replay");
        assert_eq!(a.graph.content_hash(), b.graph.content_hash());
        assert_eq!(a.lazy, b.lazy);
        assert!(a.violation_messages().is_empty(), "{:?}", a.violation_messages());
    }

    #[test]
    fn run_campaign_all_seeds_pass() {
        let config = CampaignConfig {
            seed_range: 0..12,
            ..CampaignConfig::default()
        };
        let report = run_campaign(&config).expect("campaign");
        assert_eq!(report.seeds_run, 12);
        assert!(report.all_passed(), "failures: {:?}", report.failures);
        assert!(report.lazy_evaluations <= 2 * report.naive_evaluations);
    }

    #[test]
    fn format_violation_names_the_invariant() {
        let text = format_violation(&InvariantViolation::DuplicateSeed {
            seed: "v0001".to_string(),
        });
        assert!(text.starts_with("DuplicateSeed"));
    }
}
