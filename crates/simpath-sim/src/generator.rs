//! Random influence graphs with linear-threshold weights.
//!
//! Every node draws up to `max_in_degree` distinct in-neighbours with raw
//! weights in `[min_weight, 1)`. Raw weights into a node are then scaled
//! down so they sum to at most 1, which keeps the path-enumeration spread
//! monotone and submodular.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use simpath_core::InfluenceGraph;

use crate::rng::DeterministicRng;

/// Shape of a generated graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphShape {
    pub nodes: usize,
    pub max_in_degree: usize,
    /// Lower bound on raw weights before scaling.
    pub min_weight: f64,
}

impl Default for GraphShape {
    fn default() -> Self {
        Self {
            nodes: 9,
            max_in_degree: 3,
            min_weight: 0.1,
        }
    }
}

/// Label for node `i`, zero-padded so label order is numeric order.
#[must_use]
pub fn node_label(i: usize) -> String {
    format!("v{i:04}")
}

/// Draw the weighted edge list for `shape`.
///
/// Edges come out sorted by `(from, to)`.
#[must_use]
pub fn random_edges(shape: &GraphShape, rng: &mut DeterministicRng) -> Vec<(String, String, f64)> {
    let mut raw: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    let mut others: Vec<usize> = Vec::with_capacity(shape.nodes);

    for to in 0..shape.nodes {
        others.clear();
        others.extend((0..shape.nodes).filter(|&from| from != to));
        rng.shuffle(&mut others);
        let degree = rng.next_index(shape.max_in_degree.min(others.len()) + 1);
        for &from in others.iter().take(degree) {
            raw.insert((from, to), rng.next_in(shape.min_weight, 1.0));
        }
    }

    let mut incoming = vec![0.0_f64; shape.nodes];
    for (&(_, to), &w) in &raw {
        incoming[to] += w;
    }

    raw.into_iter()
        .map(|((from, to), w)| (node_label(from), node_label(to), w / incoming[to].max(1.0)))
        .collect()
}

/// Build a random graph with every node of `shape` present.
///
/// # Errors
///
/// Returns an error if the generated edges fail graph validation.
pub fn random_graph(shape: &GraphShape, rng: &mut DeterministicRng) -> Result<InfluenceGraph> {
    let edges = random_edges(shape, rng);
    InfluenceGraph::from_parts((0..shape.nodes).map(node_label), edges)
        .context("generated edge list failed validation")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_has_every_node() {
        let shape = GraphShape::default();
        let g = random_graph(&shape, &mut DeterministicRng::new(5)).expect("graph");
        assert_eq!(g.node_count(), shape.nodes);
    }

    #[test]
    fn incoming_weights_sum_to_at_most_one() {
        let shape = GraphShape {
            nodes: 12,
            max_in_degree: 5,
            min_weight: 0.5,
        };
        let g = random_graph(&shape, &mut DeterministicRng::new(9)).expect("graph");
        for node in g.nodes() {
            let total: f64 = g.predecessors(node).map(|(_, w)| w).sum();
            assert!(total <= 1.0 + 1e-12, "in-weight {total}");
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let shape = GraphShape::default();
        let a = random_graph(&shape, &mut DeterministicRng::new(42)).expect("graph");
        let b = random_graph(&shape, &mut DeterministicRng::new(42)).expect("graph");
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn in_degree_is_capped() {
        let shape = GraphShape {
            nodes: 10,
            max_in_degree: 2,
            min_weight: 0.1,
        };
        let g = random_graph(&shape, &mut DeterministicRng::new(1)).expect("graph");
        assert!(g.nodes().all(|n| g.predecessors(n).count() <= 2));
    }
}
