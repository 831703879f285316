//! Invariant checks over a pair of selection runs on the same graph.

use std::collections::HashSet;

use simpath_core::{InfluenceGraph, SelectionConfig};
use simpath_select::{SeedSelection, celf_select, estimate_spread};

use crate::rng::DeterministicRng;

/// Absolute slack for float comparisons that are equal in exact arithmetic.
pub const EPSILON: f64 = 1e-9;

// ── Core result types ─────────────────────────────────────────────────────────

/// Oracle result for an invariant check.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleResult {
    /// `true` iff no violations were found.
    pub passed: bool,
    pub violations: Vec<InvariantViolation>,
}

impl OracleResult {
    const fn pass() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
        }
    }

    fn from_violations(violations: Vec<InvariantViolation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }

    /// Merge another result into this one (failures accumulate).
    #[must_use]
    fn merge(mut self, other: Self) -> Self {
        if !other.passed {
            self.passed = false;
            self.violations.extend(other.violations);
        }
        self
    }
}

// ── Invariant violation diagnostics ──────────────────────────────────────────

/// Diagnostic information for a single failed invariant check.
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    /// Lazy and naive greedy chose different seed sequences.
    Equivalence { lazy: Vec<String>, naive: Vec<String> },

    /// A later seed was accepted with a larger gain than an earlier one.
    GainIncrease {
        round: usize,
        previous: f64,
        next: f64,
    },

    /// Reported spread disagrees with a fresh estimate of the same seeds.
    SpreadMismatch { reported: f64, recomputed: f64 },

    /// Accepted gains do not add up to the reported spread.
    GainSum { sum: f64, spread: f64 },

    /// Spread outside `[|S|, |V|]`.
    SpreadOutOfBounds {
        spread: f64,
        seeds: usize,
        nodes: usize,
    },

    /// A node was selected twice.
    DuplicateSeed { seed: String },

    /// The selection is tagged with another graph's hash.
    GraphHashMismatch { expected: String, actual: String },

    /// Rebuilding the graph from a shuffled edge list changed the outcome.
    OrderSensitivity {
        permutation_index: usize,
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

// ── Oracle ────────────────────────────────────────────────────────────────────

/// Checks the properties every selection run must satisfy.
///
/// # Invariants checked
///
/// 1. **Equivalence**: CELF++ picks exactly what naive greedy picks.
/// 2. **Diminishing gains**: accepted gains never increase.
/// 3. **Consistency**: the reported spread matches a fresh estimate, the
///    gains telescope to it, and it lies within `[|S|, |V|]`.
/// 4. **Well-formedness**: no duplicate seeds, correct graph hash.
/// 5. **Order independence**: edge-list order does not affect the result.
pub struct SelectionOracle;

impl SelectionOracle {
    /// Run every check.
    ///
    /// `edges` is the list `graph` was built from; `shuffles` rebuilt
    /// variants are compared against `lazy`.
    #[must_use]
    pub fn check_all(
        graph: &InfluenceGraph,
        edges: &[(String, String, f64)],
        config: &SelectionConfig,
        lazy: &SeedSelection,
        naive: &SeedSelection,
        rng: &mut DeterministicRng,
        shuffles: usize,
    ) -> OracleResult {
        OracleResult::pass()
            .merge(Self::check_equivalence(lazy, naive))
            .merge(Self::check_diminishing_gains(lazy))
            .merge(Self::check_consistency(graph, config, lazy))
            .merge(Self::check_well_formed(graph, lazy))
            .merge(Self::check_order_independence(
                graph, edges, config, lazy, rng, shuffles,
            ))
    }

    // ── Invariant 1: Equivalence ─────────────────────────────────────────────

    #[must_use]
    pub fn check_equivalence(lazy: &SeedSelection, naive: &SeedSelection) -> OracleResult {
        if lazy.seeds == naive.seeds {
            OracleResult::pass()
        } else {
            OracleResult::from_violations(vec![InvariantViolation::Equivalence {
                lazy: lazy.seeds.clone(),
                naive: naive.seeds.clone(),
            }])
        }
    }

    // ── Invariant 2: Diminishing gains ───────────────────────────────────────

    #[must_use]
    pub fn check_diminishing_gains(selection: &SeedSelection) -> OracleResult {
        let violations = selection
            .gains
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[1] > pair[0] + EPSILON)
            .map(|(i, pair)| InvariantViolation::GainIncrease {
                round: i + 1,
                previous: pair[0],
                next: pair[1],
            })
            .collect();
        OracleResult::from_violations(violations)
    }

    // ── Invariant 3: Consistency ─────────────────────────────────────────────

    /// Recompute the spread from labels and compare with what was reported.
    #[must_use]
    pub fn check_consistency(
        graph: &InfluenceGraph,
        config: &SelectionConfig,
        selection: &SeedSelection,
    ) -> OracleResult {
        let mut violations = Vec::new();

        let labels: Vec<&str> = selection.seeds.iter().map(String::as_str).collect();
        match estimate_spread(graph, config, &labels) {
            Ok(recomputed) if (recomputed - selection.spread).abs() > EPSILON => {
                violations.push(InvariantViolation::SpreadMismatch {
                    reported: selection.spread,
                    recomputed,
                });
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(%err, "spread recomputation failed");
                violations.push(InvariantViolation::SpreadMismatch {
                    reported: selection.spread,
                    recomputed: f64::NAN,
                });
            }
        }

        let sum: f64 = selection.gains.iter().sum();
        if (sum - selection.spread).abs() > EPSILON {
            violations.push(InvariantViolation::GainSum {
                sum,
                spread: selection.spread,
            });
        }

        let lower = selection.len() as f64;
        let upper = graph.node_count() as f64;
        if selection.spread + EPSILON < lower || selection.spread > upper + EPSILON {
            violations.push(InvariantViolation::SpreadOutOfBounds {
                spread: selection.spread,
                seeds: selection.len(),
                nodes: graph.node_count(),
            });
        }

        OracleResult::from_violations(violations)
    }

    // ── Invariant 4: Well-formedness ─────────────────────────────────────────

    #[must_use]
    pub fn check_well_formed(graph: &InfluenceGraph, selection: &SeedSelection) -> OracleResult {
        let mut violations = Vec::new();

        let mut seen = HashSet::with_capacity(selection.len());
        for seed in &selection.seeds {
            if !seen.insert(seed.as_str()) {
                violations.push(InvariantViolation::DuplicateSeed { seed: seed.clone() });
            }
        }

        if selection.graph_hash != graph.content_hash() {
            violations.push(InvariantViolation::GraphHashMismatch {
                expected: graph.content_hash().to_string(),
                actual: selection.graph_hash.clone(),
            });
        }

        OracleResult::from_violations(violations)
    }

    // ── Invariant 5: Order independence ──────────────────────────────────────

    /// Rebuild the graph from `iterations` shuffled copies of `edges` and
    /// check the lazy selection is unchanged.
    #[must_use]
    pub fn check_order_independence(
        graph: &InfluenceGraph,
        edges: &[(String, String, f64)],
        config: &SelectionConfig,
        expected: &SeedSelection,
        rng: &mut DeterministicRng,
        iterations: usize,
    ) -> OracleResult {
        let nodes: Vec<&str> = graph
            .nodes()
            .filter_map(|n| graph.label(n))
            .collect();
        let mut violations = Vec::new();

        for permutation_index in 0..iterations {
            let mut shuffled = edges.to_vec();
            rng.shuffle(&mut shuffled);

            let actual = InfluenceGraph::from_parts(nodes.iter().copied(), shuffled)
                .and_then(|g| celf_select(&g, config, expected.len(), None))
                .map(|sel| sel.seeds)
                .unwrap_or_default();

            if actual != expected.seeds {
                violations.push(InvariantViolation::OrderSensitivity {
                    permutation_index,
                    expected: expected.seeds.clone(),
                    actual,
                });
            }
        }

        OracleResult::from_violations(violations)
    }
}
