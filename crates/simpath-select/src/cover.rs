//! Vertex-cover partition for cheap initial spread estimates.
//!
//! # Overview
//!
//! Enumerating paths from every node to get the first round of marginal
//! gains is the most expensive part of a selection run. The partition cuts
//! that work down:
//!
//! 1. Compute an approximate vertex cover `C` of the undirected projection.
//!    Every edge touches `C`, so the out-neighbours of a free node
//!    (`w ∈ U = V − C`) all lie in `C`.
//! 2. Enumerate from each needed cover node `c` once, observing its free
//!    in-neighbours. One walk yields `spread(c)` and `spread_{V−w}(c)` for
//!    every observer `w`.
//! 3. Derive each free node analytically:
//!
//! ```text
//! spread(w) = 1 + Σ_{c ∈ succ(w)} weight(w, c) · spread_{V−w}(c)
//! ```
//!
//! # Cover Algorithm
//!
//! Local-ratio 2-approximation (Bar-Yehuda & Even) with unit node weights.
//! Undirected edges are visited in ascending `(low, high)` index order, so
//! the cover is fully determined by the graph.
//!
//! # Fallback
//!
//! A caller may pin its own cover with [`VertexCoverPartition::with_cover`].
//! If that set misses an edge between two free nodes, the recurrence cannot
//! resolve the free endpoint; such nodes are enumerated directly and counted
//! in [`InitialEstimates::fallbacks`].
//!
//! # Precision
//!
//! Pruning in step 2 uses the path probability measured from `c`, not from
//! `w`, so a recurrence value can include paths that a direct walk from `w`
//! would prune. Recurrence values are therefore upper bounds on the direct
//! estimate (equal when nothing is pruned), and are flagged as inexact.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use fixedbitset::FixedBitSet;
use simpath_core::{InfluenceGraph, NodeId, SimpathError};
use tracing::{debug, instrument};

use crate::spread::SpreadEstimator;

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// Split of the node set into cover nodes and free nodes.
#[derive(Debug, Clone)]
pub struct VertexCoverPartition {
    in_cover: FixedBitSet,
    cover: Vec<NodeId>,
    free: Vec<NodeId>,
}

impl VertexCoverPartition {
    /// Compute the local-ratio cover of `graph`.
    #[must_use]
    #[instrument(skip(graph), fields(nodes = graph.node_count()))]
    pub fn compute(graph: &InfluenceGraph) -> Self {
        let n = graph.node_count();
        // Remaining unit weight per node; a node joins the cover at zero.
        let mut residual = vec![1_u32; n];

        for (u, v) in graph.undirected_edges() {
            let (ui, vi) = (u.index(), v.index());
            if residual[ui] == 0 || residual[vi] == 0 {
                continue;
            }
            let paid = residual[ui].min(residual[vi]);
            residual[ui] -= paid;
            residual[vi] -= paid;
        }

        let partition = Self::from_members(
            graph,
            residual
                .iter()
                .enumerate()
                .filter(|(_, r)| **r == 0)
                .map(|(i, _)| NodeId::new(i)),
        );
        debug!(
            cover = partition.cover.len(),
            free = partition.free.len(),
            "vertex cover computed"
        );
        partition
    }

    /// Use a caller-supplied cover. The set need not cover every edge.
    #[must_use]
    pub fn with_cover(graph: &InfluenceGraph, cover: impl IntoIterator<Item = NodeId>) -> Self {
        Self::from_members(graph, cover)
    }

    fn from_members(graph: &InfluenceGraph, members: impl IntoIterator<Item = NodeId>) -> Self {
        let n = graph.node_count();
        let mut in_cover = FixedBitSet::with_capacity(n);
        for m in members {
            if m.index() < n {
                in_cover.insert(m.index());
            }
        }
        let (cover, free) = graph.nodes().partition(|node| in_cover.contains(node.index()));
        Self {
            in_cover,
            cover,
            free,
        }
    }

    /// `true` if `node` belongs to the cover.
    #[must_use]
    pub fn is_cover_node(&self, node: NodeId) -> bool {
        self.in_cover.contains(node.index())
    }

    /// Cover nodes in ascending order.
    #[must_use]
    pub fn cover(&self) -> &[NodeId] {
        &self.cover
    }

    /// Free nodes in ascending order.
    #[must_use]
    pub fn free(&self) -> &[NodeId] {
        &self.free
    }

    /// `true` if every edge of `graph` has a cover endpoint.
    #[must_use]
    pub fn covers(&self, graph: &InfluenceGraph) -> bool {
        graph
            .undirected_edges()
            .into_iter()
            .all(|(u, v)| self.is_cover_node(u) || self.is_cover_node(v))
    }

    /// Initial single-node spread estimates for `candidates`.
    ///
    /// # Errors
    ///
    /// [`SimpathError::StepBudgetExceeded`] if an enumeration hits the cap.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub fn initial_estimates(
        &self,
        estimator: &SpreadEstimator<'_>,
        candidates: &[NodeId],
    ) -> Result<InitialEstimates, SimpathError> {
        let graph = estimator.graph();
        let full = graph.full_view();

        let mut direct: BTreeSet<NodeId> = BTreeSet::new();
        let mut resolvable: Vec<NodeId> = Vec::new();
        let mut fallback: Vec<NodeId> = Vec::new();
        // Cover node → free in-neighbours that need `spread_{V−w}(c)`.
        let mut observers: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();

        for &node in candidates {
            if self.is_cover_node(node) {
                direct.insert(node);
            } else if graph.successors(node).all(|(s, _)| self.is_cover_node(s)) {
                resolvable.push(node);
                for (s, _) in graph.successors(node) {
                    observers.entry(s).or_default().push(node);
                }
            } else {
                fallback.push(node);
            }
        }

        let mut spreads: HashMap<NodeId, f64> = HashMap::with_capacity(candidates.len());
        let mut without: HashMap<(NodeId, NodeId), f64> = HashMap::new();
        let mut enumerations = 0_usize;

        let roots: BTreeSet<NodeId> = direct.iter().chain(observers.keys()).copied().collect();
        for root in roots {
            let watched = observers.get(&root).map_or(&[][..], Vec::as_slice);
            let run = estimator.enumerate(root, &full, watched)?;
            enumerations += 1;
            if direct.contains(&root) {
                spreads.insert(root, run.spread);
            }
            for (i, &w) in watched.iter().enumerate() {
                without.insert((root, w), run.spread_without(i));
            }
        }

        for &w in &resolvable {
            let mut spread = 1.0;
            for (c, weight) in graph.successors(w) {
                spread += weight * without[&(c, w)];
            }
            spreads.insert(w, spread);
        }

        for &w in &fallback {
            debug!(node = w.index(), "free node has a free successor, enumerating directly");
            spreads.insert(w, estimator.enumerate(w, &full, &[])?.spread);
            enumerations += 1;
        }

        let estimates = candidates
            .iter()
            .map(|&node| {
                let source = if direct.contains(&node) {
                    EstimateSource::Enumerated
                } else if fallback.contains(&node) {
                    EstimateSource::Fallback
                } else {
                    EstimateSource::Recurrence
                };
                // A sink's recurrence value is the exact 1.0.
                let exact = source != EstimateSource::Recurrence
                    || graph.successors(node).next().is_none();
                InitialEstimate {
                    node,
                    spread: spreads[&node],
                    source,
                    exact,
                }
            })
            .collect();

        Ok(InitialEstimates {
            estimates,
            enumerations,
            fallbacks: fallback.len(),
        })
    }
}

// ---------------------------------------------------------------------------
// Estimates
// ---------------------------------------------------------------------------

/// How an initial estimate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateSource {
    /// Direct enumeration from a cover node.
    Enumerated,
    /// Analytic recurrence for a free node.
    Recurrence,
    /// Direct enumeration from a free node the recurrence could not resolve.
    Fallback,
}

/// Initial spread estimate for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialEstimate {
    pub node: NodeId,
    pub spread: f64,
    pub source: EstimateSource,
    /// `true` when `spread` equals what a direct enumeration would return.
    pub exact: bool,
}

/// Initial estimates plus bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialEstimates {
    /// One entry per candidate, in candidate order.
    pub estimates: Vec<InitialEstimate>,
    /// Number of path enumerations performed.
    pub enumerations: usize,
    /// Free candidates that fell back to direct enumeration.
    pub fallbacks: usize,
}
