//! SimPath spread estimation for seed sets.
//!
//! # Overview
//!
//! The spread of a seed set is the sum of per-seed enumerations, each one
//! restricted to the subgraph that excludes every *other* seed:
//!
//! ```text
//! spread(S) = Σ_{s ∈ S} backtrack(s, tol, V − S + s)
//! ```
//!
//! Excluding the other seeds stops a path from re-entering through a node
//! that is already active, so no activation is counted twice.
//!
//! # Marginal Gains
//!
//! Selectors need `spread(S ∪ {x}) − spread(S)` over and over for the same
//! `S`. A [`SeedBaseline`] caches the per-seed contributions of `spread(S)`;
//! [`SpreadEstimator::marginal_gain`] then evaluates
//!
//! ```text
//! backtrack(x, V − S) + Σ_{s ∈ S} [backtrack(s, V − S − x + s) − c_s]
//! ```
//!
//! which is the same quantity, summed so that a seed whose paths never touch
//! `x` contributes exactly `0.0`.
//!
//! [`SpreadEstimator::lookahead_gains`] evaluates the same sum for a batch of
//! candidates, reading every `backtrack(s, V − S − x + s)` off one observed
//! walk per seed.

pub mod backtrack;

use std::collections::HashSet;

use simpath_core::{InfluenceGraph, NodeId, SelectionConfig, SimpathError, SubgraphView};
use tracing::instrument;

pub use backtrack::{PathEnumeration, backtrack};

// ---------------------------------------------------------------------------
// SpreadEstimator
// ---------------------------------------------------------------------------

/// Path-enumeration spread estimator bound to one graph and tolerance.
///
/// Holds no mutable state; every call owns its own path stack, so one
/// estimator can serve any number of evaluations over the shared graph.
#[derive(Debug, Clone, Copy)]
pub struct SpreadEstimator<'g> {
    graph: &'g InfluenceGraph,
    tolerance: f64,
    max_steps: Option<u64>,
}

impl<'g> SpreadEstimator<'g> {
    /// Bind an estimator to `graph` with the tolerance and step cap from
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns the validation error of `config`.
    pub fn new(graph: &'g InfluenceGraph, config: &SelectionConfig) -> Result<Self, SimpathError> {
        config.validate()?;
        Ok(Self {
            graph,
            tolerance: config.tolerance,
            max_steps: config.max_steps,
        })
    }

    /// The graph this estimator reads.
    #[must_use]
    pub const fn graph(&self) -> &'g InfluenceGraph {
        self.graph
    }

    /// The pruning tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Enumerate from `root` inside `view`, accumulating `observers`.
    ///
    /// # Errors
    ///
    /// [`SimpathError::StepBudgetExceeded`] if the step cap is hit.
    pub fn enumerate(
        &self,
        root: NodeId,
        view: &SubgraphView<'_>,
        observers: &[NodeId],
    ) -> Result<PathEnumeration, SimpathError> {
        backtrack(root, self.tolerance, view, observers, self.max_steps)
    }

    /// Cache the per-seed contributions of `spread(seeds)`.
    ///
    /// # Errors
    ///
    /// [`SimpathError::StepBudgetExceeded`] if the step cap is hit.
    pub fn baseline(&self, seeds: &[NodeId]) -> Result<SeedBaseline, SimpathError> {
        let excluded = self.graph.full_view().excluding(seeds.iter().copied());
        let contributions = seeds
            .iter()
            .map(|&s| {
                self.enumerate(s, &excluded.with(s), &[])
                    .map(|run| run.spread)
            })
            .collect::<Result<Vec<f64>, SimpathError>>()?;
        let total = contributions.iter().sum();

        Ok(SeedBaseline {
            seeds: seeds.to_vec(),
            contributions,
            total,
        })
    }

    /// Estimated spread of `seeds`.
    ///
    /// # Errors
    ///
    /// [`SimpathError::StepBudgetExceeded`] if the step cap is hit.
    pub fn spread(&self, seeds: &[NodeId]) -> Result<f64, SimpathError> {
        Ok(self.baseline(seeds)?.total)
    }

    /// `spread(S ∪ {x}) − spread(S)` for the seeds `S` cached in `base`.
    ///
    /// # Panics
    ///
    /// Panics if `x` is already one of the baseline seeds.
    ///
    /// # Errors
    ///
    /// [`SimpathError::StepBudgetExceeded`] if the step cap is hit.
    pub fn marginal_gain(&self, base: &SeedBaseline, x: NodeId) -> Result<f64, SimpathError> {
        assert!(
            !base.seeds.contains(&x),
            "marginal gain requested for a node already in the seed set"
        );

        let excluded = self.graph.full_view().excluding(base.seeds.iter().copied());
        let mut gain = self.enumerate(x, &excluded, &[])?.spread;

        let without_x = excluded.without(x);
        for (&s, &c) in base.seeds.iter().zip(&base.contributions) {
            gain += self.enumerate(s, &without_x.with(s), &[])?.spread - c;
        }

        Ok(gain)
    }

    /// [`Self::marginal_gain`] for a batch of candidates at once.
    ///
    /// Each seed is walked once in `V − S + s` with the whole batch as
    /// observers, so the batch costs `|S| + |batch|` walks instead of
    /// `|batch| · (|S| + 1)`. Each result is bit-identical to the
    /// corresponding [`Self::marginal_gain`] call.
    ///
    /// The seed walks also cover paths through the candidates, so a step cap
    /// can trip here where the single calls would stay under it.
    ///
    /// # Panics
    ///
    /// Panics if a candidate is already one of the baseline seeds.
    ///
    /// # Errors
    ///
    /// [`SimpathError::StepBudgetExceeded`] if the step cap is hit.
    pub fn lookahead_gains(
        &self,
        base: &SeedBaseline,
        candidates: &[NodeId],
    ) -> Result<Vec<f64>, SimpathError> {
        assert!(
            candidates.iter().all(|x| !base.seeds.contains(x)),
            "lookahead gains requested for a node already in the seed set"
        );

        let excluded = self.graph.full_view().excluding(base.seeds.iter().copied());
        let mut gains = candidates
            .iter()
            .map(|&x| self.enumerate(x, &excluded, &[]).map(|run| run.spread))
            .collect::<Result<Vec<f64>, SimpathError>>()?;

        for (&s, &c) in base.seeds.iter().zip(&base.contributions) {
            let run = self.enumerate(s, &excluded.with(s), candidates)?;
            for (i, gain) in gains.iter_mut().enumerate() {
                *gain += run.spread_without(i) - c;
            }
        }

        Ok(gains)
    }
}

// ---------------------------------------------------------------------------
// SeedBaseline
// ---------------------------------------------------------------------------

/// Per-seed spread contributions for a fixed seed set.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedBaseline {
    seeds: Vec<NodeId>,
    contributions: Vec<f64>,
    total: f64,
}

impl SeedBaseline {
    /// Seeds in selection order.
    #[must_use]
    pub fn seeds(&self) -> &[NodeId] {
        &self.seeds
    }

    /// `backtrack(s, V − S + s)` for each seed, aligned with [`Self::seeds`].
    #[must_use]
    pub fn contributions(&self) -> &[f64] {
        &self.contributions
    }

    /// Estimated spread of the whole seed set.
    #[must_use]
    pub const fn total(&self) -> f64 {
        self.total
    }
}

// ---------------------------------------------------------------------------
// Convenience entry point
// ---------------------------------------------------------------------------

/// Estimate the spread of a labelled seed set.
///
/// # Errors
///
/// - [`SimpathError::InvalidTolerance`] / [`SimpathError::InvalidArgument`]
///   for a bad config.
/// - [`SimpathError::InvalidArgument`] for an unknown or repeated seed.
/// - [`SimpathError::StepBudgetExceeded`] if the step cap is hit.
#[instrument(skip(graph, config), fields(nodes = graph.node_count()))]
pub fn estimate_spread(
    graph: &InfluenceGraph,
    config: &SelectionConfig,
    seeds: &[&str],
) -> Result<f64, SimpathError> {
    let estimator = SpreadEstimator::new(graph, config)?;

    let mut seen = HashSet::with_capacity(seeds.len());
    let mut ids = Vec::with_capacity(seeds.len());
    for &label in seeds {
        let id = graph
            .node_index(label)
            .ok_or_else(|| SimpathError::InvalidArgument(format!("unknown seed node '{label}'")))?;
        if !seen.insert(id) {
            return Err(SimpathError::InvalidArgument(format!(
                "seed node '{label}' listed twice"
            )));
        }
        ids.push(id);
    }

    estimator.spread(&ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn config(tol: f64) -> SelectionConfig {
        SelectionConfig::with_tolerance(tol)
    }

    #[test]
    fn single_seed_spread() {
        let g = InfluenceGraph::from_edges([("a", "b", 0.5)]).expect("build");
        let spread = estimate_spread(&g, &config(0.1), &["a"]).expect("spread");
        assert!((spread - 1.5).abs() < EPS);
    }

    #[test]
    fn other_seeds_block_paths() {
        // a → b → c: with both a and b seeded, a's paths stop at b.
        let g = InfluenceGraph::from_edges([("a", "b", 0.5), ("b", "c", 0.5)]).expect("build");
        let spread = estimate_spread(&g, &config(0.01), &["a", "b"]).expect("spread");
        // a alone in V − {b}: 1. b in V − {a}: 1 + 0.5.
        assert!((spread - 2.5).abs() < EPS);
    }

    #[test]
    fn empty_seed_set_has_zero_spread() {
        let g = InfluenceGraph::from_edges([("a", "b", 0.5)]).expect("build");
        let spread = estimate_spread(&g, &config(0.1), &[]).expect("spread");
        assert!(spread.abs() < EPS);
    }

    #[test]
    fn marginal_gain_matches_spread_difference() {
        let g = InfluenceGraph::from_edges([
            ("a", "b", 0.4),
            ("b", "c", 0.5),
            ("c", "a", 0.3),
            ("a", "d", 0.6),
            ("d", "c", 0.2),
        ])
        .expect("build");
        let est = SpreadEstimator::new(&g, &config(1e-4)).expect("estimator");
        let ids: Vec<NodeId> = ["a", "c"]
            .iter()
            .map(|l| g.node_index(l).expect("node"))
            .collect();
        let x = g.node_index("d").expect("d");

        let base = est.baseline(&ids).expect("baseline");
        let gain = est.marginal_gain(&base, x).expect("gain");

        let mut with_x = ids.clone();
        with_x.push(x);
        let diff = est.spread(&with_x).expect("spread") - base.total();
        assert!((gain - diff).abs() < 1e-9, "{gain} vs {diff}");
    }

    #[test]
    fn unaffected_seed_contributes_exact_zero() {
        let g = InfluenceGraph::from_edges([("a", "b", 0.9), ("c", "d", 0.9)]).expect("build");
        let est = SpreadEstimator::new(&g, &config(0.1)).expect("estimator");
        let a = g.node_index("a").expect("a");
        let c = g.node_index("c").expect("c");

        let alone = est.marginal_gain(&est.baseline(&[]).expect("base"), c).expect("gain");
        let after_a = est.marginal_gain(&est.baseline(&[a]).expect("base"), c).expect("gain");
        assert_eq!(alone.to_bits(), after_a.to_bits());
    }

    #[test]
    fn unknown_or_repeated_seed_rejected() {
        let g = InfluenceGraph::from_edges([("a", "b", 0.5)]).expect("build");
        assert!(matches!(
            estimate_spread(&g, &config(0.1), &["zz"]),
            Err(SimpathError::InvalidArgument(_))
        ));
        assert!(matches!(
            estimate_spread(&g, &config(0.1), &["a", "a"]),
            Err(SimpathError::InvalidArgument(_))
        ));
    }

    #[test]
    fn invalid_tolerance_rejected() {
        let g = InfluenceGraph::from_edges([("a", "b", 0.5)]).expect("build");
        assert_eq!(
            estimate_spread(&g, &config(0.0), &["a"]),
            Err(SimpathError::InvalidTolerance(0.0))
        );
    }

    #[test]
    fn lookahead_gains_match_marginal_gains_bitwise() {
        let g = InfluenceGraph::from_edges([
            ("a", "b", 0.4),
            ("b", "c", 0.5),
            ("c", "a", 0.3),
            ("a", "d", 0.6),
            ("d", "c", 0.2),
            ("e", "b", 0.3),
        ])
        .expect("build");
        let est = SpreadEstimator::new(&g, &config(1e-3)).expect("estimator");
        let seeds: Vec<NodeId> = ["a", "e"]
            .iter()
            .map(|l| g.node_index(l).expect("node"))
            .collect();
        let batch: Vec<NodeId> = ["b", "c", "d"]
            .iter()
            .map(|l| g.node_index(l).expect("node"))
            .collect();

        let base = est.baseline(&seeds).expect("baseline");
        let batched = est.lookahead_gains(&base, &batch).expect("batch");
        for (&x, gain) in batch.iter().zip(&batched) {
            let single = est.marginal_gain(&base, x).expect("gain");
            assert_eq!(gain.to_bits(), single.to_bits(), "{gain} vs {single}");
        }
    }

    #[test]
    fn lookahead_gains_on_empty_seed_set_are_spreads() {
        let g = InfluenceGraph::from_edges([("a", "b", 0.5), ("b", "c", 0.5)]).expect("build");
        let est = SpreadEstimator::new(&g, &config(0.01)).expect("estimator");
        let nodes: Vec<NodeId> = g.nodes().collect();
        let gains = est
            .lookahead_gains(&est.baseline(&[]).expect("base"), &nodes)
            .expect("batch");
        assert!((gains[0] - 1.75).abs() < EPS);
        assert!((gains[1] - 1.5).abs() < EPS);
        assert!((gains[2] - 1.0).abs() < EPS);
    }
}
