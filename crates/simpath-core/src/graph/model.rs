//! Influence graph construction and adjacency queries.
//!
//! # Overview
//!
//! [`InfluenceGraph`] is a directed graph whose edge weights are propagation
//! probabilities. An edge `A → B` with weight `p` means "once A is active it
//! activates B with probability `p`".
//!
//! ## Node Ordering
//!
//! Node labels are inserted into the underlying [`petgraph`] graph in sorted
//! order, so comparing two `NodeIndex` values is the same as comparing their
//! labels. Every tie-break in the selectors ("lowest node id wins") relies on
//! this.
//!
//! ## Validation
//!
//! Construction fails fast on the first bad edge:
//!
//! - self loop or duplicate `(source, target)` pair → [`SimpathError::InvalidEdge`]
//! - weight not in `(0, 1]` → [`SimpathError::InvalidWeight`]
//!
//! The graph is never mutated after construction.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use tracing::instrument;

use crate::error::{Result, SimpathError};
use crate::graph::view::SubgraphView;

// ---------------------------------------------------------------------------
// InfluenceGraph
// ---------------------------------------------------------------------------

/// Immutable directed graph with propagation-probability edge weights.
#[derive(Debug, Clone)]
pub struct InfluenceGraph {
    graph: DiGraph<String, f64>,
    node_map: HashMap<String, NodeIndex>,
    content_hash: String,
}

impl InfluenceGraph {
    /// Build a graph from a weighted edge list.
    ///
    /// The node set is the set of edge endpoints.
    ///
    /// # Errors
    ///
    /// See [`InfluenceGraph::from_parts`].
    pub fn from_edges<I, S>(edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S, f64)>,
        S: Into<String>,
    {
        Self::from_parts(std::iter::empty::<String>(), edges)
    }

    /// Build a graph from an explicit node list plus a weighted edge list.
    ///
    /// Nodes that only appear in `nodes` become isolated nodes. Edge
    /// endpoints missing from `nodes` are added automatically.
    ///
    /// # Errors
    ///
    /// Returns [`SimpathError::InvalidEdge`] for a self loop or duplicate
    /// edge, and [`SimpathError::InvalidWeight`] for a weight outside
    /// `(0, 1]`.
    #[instrument(skip_all)]
    pub fn from_parts<N, NS, I, S>(nodes: N, edges: I) -> Result<Self>
    where
        N: IntoIterator<Item = NS>,
        NS: Into<String>,
        I: IntoIterator<Item = (S, S, f64)>,
        S: Into<String>,
    {
        let mut labels: BTreeSet<String> = nodes.into_iter().map(Into::into).collect();
        let mut weighted: BTreeMap<(String, String), f64> = BTreeMap::new();

        for (from, to, weight) in edges {
            let from: String = from.into();
            let to: String = to.into();

            if from == to {
                return Err(SimpathError::InvalidEdge {
                    from,
                    to,
                    reason: "self loop",
                });
            }
            if !(weight > 0.0 && weight <= 1.0) {
                return Err(SimpathError::InvalidWeight { from, to, weight });
            }
            if weighted.contains_key(&(from.clone(), to.clone())) {
                return Err(SimpathError::InvalidEdge {
                    from,
                    to,
                    reason: "duplicate edge",
                });
            }

            labels.insert(from.clone());
            labels.insert(to.clone());
            weighted.insert((from, to), weight);
        }

        let content_hash = compute_edge_hash(&labels, &weighted);

        let mut graph = DiGraph::<String, f64>::with_capacity(labels.len(), weighted.len());
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(labels.len());

        // BTreeSet iteration is sorted, so index order == label order.
        for label in labels {
            let idx = graph.add_node(label.clone());
            node_map.insert(label, idx);
        }

        for ((from, to), weight) in weighted {
            graph.add_edge(node_map[&from], node_map[&to], weight);
        }

        Ok(Self {
            graph,
            node_map,
            content_hash,
        })
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// `true` when the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up the `NodeIndex` for a node label.
    #[must_use]
    pub fn node_index(&self, label: &str) -> Option<NodeIndex> {
        self.node_map.get(label).copied()
    }

    /// Return the label for a node.
    #[must_use]
    pub fn label(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// Return labels for a sequence of nodes, skipping unknown indices.
    #[must_use]
    pub fn labels(&self, nodes: &[NodeIndex]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|&n| self.label(n).map(str::to_owned))
            .collect()
    }

    /// All node indices in ascending (label) order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Out-neighbours of `node` with the edge weight.
    pub fn successors(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.target(), *e.weight()))
    }

    /// In-neighbours of `node` with the edge weight.
    pub fn predecessors(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| (e.source(), *e.weight()))
    }

    /// Weight of the edge `from → to`, if present.
    #[must_use]
    pub fn weight(&self, from: NodeIndex, to: NodeIndex) -> Option<f64> {
        self.graph
            .find_edge(from, to)
            .and_then(|e| self.graph.edge_weight(e))
            .copied()
    }

    /// `true` if every node's incoming weights sum to at most 1.
    ///
    /// Allows `1e-9` of rounding slack. Path-enumeration spread is monotone
    /// and submodular only under this linear-threshold condition.
    #[must_use]
    pub fn is_linear_threshold(&self) -> bool {
        self.nodes()
            .all(|node| self.predecessors(node).map(|(_, w)| w).sum::<f64>() <= 1.0 + 1e-9)
    }

    /// Edges of the undirected projection as `(low, high)` pairs.
    ///
    /// Sorted ascending; a reciprocal pair `A → B`, `B → A` yields one entry.
    #[must_use]
    pub fn undirected_edges(&self) -> Vec<(NodeIndex, NodeIndex)> {
        let pairs: BTreeSet<(NodeIndex, NodeIndex)> = self
            .graph
            .edge_references()
            .map(|e| {
                let (a, b) = (e.source(), e.target());
                if a < b { (a, b) } else { (b, a) }
            })
            .collect();
        pairs.into_iter().collect()
    }

    /// BLAKE3 fingerprint of the node set and weighted edge list.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// A view containing every node.
    #[must_use]
    pub fn full_view(&self) -> SubgraphView<'_> {
        SubgraphView::full(self)
    }

    /// A view restricted to `nodes`.
    #[must_use]
    pub fn view_of(&self, nodes: impl IntoIterator<Item = NodeIndex>) -> SubgraphView<'_> {
        SubgraphView::of(self, nodes)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Hash the sorted node labels and weighted edges.
fn compute_edge_hash(labels: &BTreeSet<String>, edges: &BTreeMap<(String, String), f64>) -> String {
    let mut hasher = blake3::Hasher::new();
    for label in labels {
        hasher.update(label.as_bytes());
        hasher.update(b"\x00");
    }
    hasher.update(b"\x01");
    for ((from, to), weight) in edges {
        hasher.update(from.as_bytes());
        hasher.update(b"\x00");
        hasher.update(to.as_bytes());
        hasher.update(b"\x00");
        hasher.update(&weight.to_bits().to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(g: &InfluenceGraph, label: &str) -> NodeIndex {
        g.node_index(label).expect("node exists")
    }

    #[test]
    fn empty_edge_list_produces_empty_graph() {
        let g = InfluenceGraph::from_edges(Vec::<(&str, &str, f64)>::new()).expect("build");
        assert!(g.is_empty());
        assert_eq!(g.edge_count(), 0);
        assert!(g.content_hash().starts_with("blake3:"));
    }

    #[test]
    fn node_indices_follow_label_order() {
        let g = InfluenceGraph::from_edges([("c", "a", 0.5), ("b", "c", 0.5)]).expect("build");
        let a = idx(&g, "a");
        let b = idx(&g, "b");
        let c = idx(&g, "c");
        assert!(a < b && b < c);
        assert_eq!(g.label(a), Some("a"));
    }

    #[test]
    fn isolated_nodes_are_kept() {
        let g = InfluenceGraph::from_parts(["z", "a"], [("a", "b", 0.3)]).expect("build");
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.successors(idx(&g, "z")).count(), 0);
    }

    #[test]
    fn adjacency_queries() {
        let g = InfluenceGraph::from_edges([("a", "b", 0.5), ("a", "c", 0.25), ("c", "b", 1.0)])
            .expect("build");
        let (a, b, c) = (idx(&g, "a"), idx(&g, "b"), idx(&g, "c"));

        let mut succ: Vec<_> = g.successors(a).collect();
        succ.sort_by_key(|(n, _)| *n);
        assert_eq!(succ, vec![(b, 0.5), (c, 0.25)]);

        let mut pred: Vec<_> = g.predecessors(b).map(|(n, _)| n).collect();
        pred.sort();
        assert_eq!(pred, vec![a, c]);

        assert_eq!(g.weight(c, b), Some(1.0));
        assert_eq!(g.weight(b, c), None);
    }

    #[test]
    fn linear_threshold_check_sums_incoming_weights() {
        let lt = InfluenceGraph::from_edges([("a", "c", 0.6), ("b", "c", 0.4), ("c", "a", 1.0)])
            .expect("build");
        assert!(lt.is_linear_threshold());

        let heavy = InfluenceGraph::from_edges([("a", "b", 0.9), ("a", "c", 0.9), ("c", "b", 0.9)])
            .expect("build");
        assert!(!heavy.is_linear_threshold());
    }

    #[test]
    fn self_loop_rejected() {
        let err = InfluenceGraph::from_edges([("a", "a", 0.5)]).expect_err("self loop");
        assert!(matches!(err, SimpathError::InvalidEdge { reason: "self loop", .. }));
    }

    #[test]
    fn duplicate_edge_rejected() {
        let err = InfluenceGraph::from_edges([("a", "b", 0.5), ("a", "b", 0.4)])
            .expect_err("duplicate");
        assert!(matches!(
            err,
            SimpathError::InvalidEdge {
                reason: "duplicate edge",
                ..
            }
        ));
    }

    #[test]
    fn reciprocal_edges_are_not_duplicates() {
        let g = InfluenceGraph::from_edges([("a", "b", 0.5), ("b", "a", 0.5)]).expect("build");
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.undirected_edges().len(), 1);
    }

    #[test]
    fn out_of_range_weights_rejected() {
        for w in [0.0, -0.1, 1.2, f64::NAN, f64::INFINITY] {
            let err = InfluenceGraph::from_edges([("a", "b", w)]).expect_err("bad weight");
            assert!(
                matches!(err, SimpathError::InvalidWeight { .. }),
                "weight {w} gave {err:?}"
            );
        }
        assert!(InfluenceGraph::from_edges([("a", "b", 1.0)]).is_ok());
    }

    #[test]
    fn content_hash_is_order_independent_but_weight_sensitive() {
        let g1 = InfluenceGraph::from_edges([("a", "b", 0.5), ("b", "c", 0.5)]).expect("build");
        let g2 = InfluenceGraph::from_edges([("b", "c", 0.5), ("a", "b", 0.5)]).expect("build");
        let g3 = InfluenceGraph::from_edges([("a", "b", 0.5), ("b", "c", 0.6)]).expect("build");
        assert_eq!(g1.content_hash(), g2.content_hash());
        assert_ne!(g1.content_hash(), g3.content_hash());
    }

    mod props {
        use std::collections::BTreeMap;

        use proptest::prelude::*;

        use super::*;

        /// Unique, loop-free edges over labels `n0..n5`.
        fn arb_edges() -> impl Strategy<Value = Vec<(String, String, f64)>> {
            prop::collection::vec((0_u8..6, 0_u8..6, 0.01_f64..=1.0), 0..20).prop_map(|raw| {
                raw.into_iter()
                    .filter(|&(a, b, _)| a != b)
                    .map(|(a, b, w)| ((a, b), w))
                    .collect::<BTreeMap<_, _>>()
                    .into_iter()
                    .map(|((a, b), w)| (format!("n{a}"), format!("n{b}"), w))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn edge_order_does_not_matter(edges in arb_edges()) {
                let forward = InfluenceGraph::from_edges(edges.clone()).expect("build");
                let mut reversed_edges = edges;
                reversed_edges.reverse();
                let reversed = InfluenceGraph::from_edges(reversed_edges).expect("build");

                prop_assert_eq!(forward.content_hash(), reversed.content_hash());
                prop_assert_eq!(forward.node_count(), reversed.node_count());
                for node in forward.nodes() {
                    prop_assert_eq!(forward.label(node), reversed.label(node));
                }
            }

            #[test]
            fn undirected_projection_covers_every_edge(edges in arb_edges()) {
                let g = InfluenceGraph::from_edges(edges).expect("build");
                let projected = g.undirected_edges();
                prop_assert!(projected.windows(2).all(|w| w[0] < w[1]));
                for from in g.nodes() {
                    for (to, _) in g.successors(from) {
                        let key = (from.min(to), from.max(to));
                        prop_assert!(projected.binary_search(&key).is_ok());
                    }
                }
            }
        }
    }
}
