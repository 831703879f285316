//! Result types and input validation shared by the seed selectors.

use std::collections::HashSet;

use serde::Serialize;
use simpath_core::{InfluenceGraph, NodeId, SelectionConfig, SimpathError};

/// Counters describing how much work a selection run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelectionStats {
    /// Enumerations spent on initial single-node estimates.
    pub initial_enumerations: usize,
    /// Free candidates whose cover recurrence fell back to enumeration.
    pub cover_fallbacks: usize,
    /// Marginal gains computed after the initial estimates, batched or not.
    pub gain_evaluations: usize,
    /// Candidates whose `mg1` was recomputed.
    pub recomputations: usize,
    /// Candidates revalidated from `mg2` with no estimator call.
    pub mg2_reuses: usize,
}

/// Outcome of a seed-selection run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedSelection {
    /// Seed labels in selection order.
    pub seeds: Vec<String>,
    /// Seed node handles, aligned with `seeds`.
    #[serde(skip)]
    pub seed_ids: Vec<NodeId>,
    /// Marginal gain of each seed at the moment it was accepted.
    pub gains: Vec<f64>,
    /// Estimated spread of the final seed set.
    pub spread: f64,
    /// Content hash of the graph the seeds were selected on.
    pub graph_hash: String,
    pub stats: SelectionStats,
}

impl SeedSelection {
    pub(crate) fn empty(graph: &InfluenceGraph) -> Self {
        Self {
            seeds: Vec::new(),
            seed_ids: Vec::new(),
            gains: Vec::new(),
            spread: 0.0,
            graph_hash: graph.content_hash().to_string(),
            stats: SelectionStats::default(),
        }
    }

    /// Number of seeds chosen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    /// `true` if no seeds were chosen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}

/// Validate a selection request and resolve its candidate pool.
///
/// Returns `Ok(None)` for an empty graph (the selection is empty), otherwise
/// the candidate nodes in ascending order.
pub(crate) fn resolve_candidates(
    graph: &InfluenceGraph,
    config: &SelectionConfig,
    k: usize,
    pool: Option<&[&str]>,
) -> Result<Option<Vec<NodeId>>, SimpathError> {
    config.validate()?;

    if graph.is_empty() {
        return Ok(None);
    }

    let mut candidates: Vec<NodeId> = match pool {
        None => graph.nodes().collect(),
        Some(labels) => {
            let mut seen = HashSet::with_capacity(labels.len());
            let mut ids = Vec::with_capacity(labels.len());
            for &label in labels {
                let id = graph.node_index(label).ok_or_else(|| {
                    SimpathError::InvalidArgument(format!("unknown candidate node '{label}'"))
                })?;
                if !seen.insert(id) {
                    return Err(SimpathError::InvalidArgument(format!(
                        "candidate node '{label}' listed twice"
                    )));
                }
                ids.push(id);
            }
            ids
        }
    };
    candidates.sort_unstable();

    if k > candidates.len() {
        return Err(SimpathError::InsufficientNodes {
            requested: k,
            available: candidates.len(),
        });
    }

    Ok(Some(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> InfluenceGraph {
        InfluenceGraph::from_edges([("a", "b", 0.5), ("b", "c", 0.5)]).expect("build")
    }

    #[test]
    fn full_pool_is_every_node() {
        let g = graph();
        let c = resolve_candidates(&g, &SelectionConfig::default(), 2, None)
            .expect("valid")
            .expect("non-empty");
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn pool_restricts_and_sorts() {
        let g = graph();
        let c = resolve_candidates(&g, &SelectionConfig::default(), 1, Some(&["c", "a"]))
            .expect("valid")
            .expect("non-empty");
        assert_eq!(g.labels(&c), vec!["a", "c"]);
    }

    #[test]
    fn too_many_seeds() {
        let g = graph();
        assert_eq!(
            resolve_candidates(&g, &SelectionConfig::default(), 4, None),
            Err(SimpathError::InsufficientNodes {
                requested: 4,
                available: 3
            })
        );
        assert!(matches!(
            resolve_candidates(&g, &SelectionConfig::default(), 2, Some(&["a"])),
            Err(SimpathError::InsufficientNodes { .. })
        ));
    }

    #[test]
    fn unknown_and_duplicate_pool_entries() {
        let g = graph();
        assert!(matches!(
            resolve_candidates(&g, &SelectionConfig::default(), 1, Some(&["q"])),
            Err(SimpathError::InvalidArgument(_))
        ));
        assert!(matches!(
            resolve_candidates(&g, &SelectionConfig::default(), 1, Some(&["a", "a"])),
            Err(SimpathError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_graph_short_circuits() {
        let g = InfluenceGraph::from_edges(Vec::<(&str, &str, f64)>::new()).expect("build");
        assert_eq!(
            resolve_candidates(&g, &SelectionConfig::default(), 3, None),
            Ok(None)
        );
    }

    #[test]
    fn config_checked_first() {
        let g = InfluenceGraph::from_edges(Vec::<(&str, &str, f64)>::new()).expect("build");
        assert!(matches!(
            resolve_candidates(&g, &SelectionConfig::with_tolerance(-1.0), 0, None),
            Err(SimpathError::InvalidTolerance(_))
        ));
    }
}
