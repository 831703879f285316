//! Read-only node-subset views over an [`InfluenceGraph`].
//!
//! A view is a bit mask over node indices plus a borrow of the graph. It
//! never copies adjacency: neighbour queries go to the underlying graph and
//! filter by the mask. Views compose by intersection, which is how the
//! estimator realizes subgraphs like `V − S + s`.

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;

use crate::graph::model::InfluenceGraph;

/// Subgraph induced by an allowed node set.
#[derive(Debug, Clone)]
pub struct SubgraphView<'g> {
    graph: &'g InfluenceGraph,
    allowed: FixedBitSet,
}

impl<'g> SubgraphView<'g> {
    /// View containing every node of `graph`.
    #[must_use]
    pub fn full(graph: &'g InfluenceGraph) -> Self {
        let mut allowed = FixedBitSet::with_capacity(graph.node_count());
        allowed.insert_range(..);
        Self { graph, allowed }
    }

    /// View containing only `nodes` (indices outside the graph are ignored).
    #[must_use]
    pub fn of(graph: &'g InfluenceGraph, nodes: impl IntoIterator<Item = NodeIndex>) -> Self {
        let n = graph.node_count();
        let mut allowed = FixedBitSet::with_capacity(n);
        for node in nodes {
            if node.index() < n {
                allowed.insert(node.index());
            }
        }
        Self { graph, allowed }
    }

    /// The underlying graph.
    #[must_use]
    pub const fn graph(&self) -> &'g InfluenceGraph {
        self.graph
    }

    /// `true` if `node` is part of this view.
    #[must_use]
    pub fn contains(&self, node: NodeIndex) -> bool {
        self.allowed.contains(node.index())
    }

    /// Number of nodes in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allowed.count_ones(..)
    }

    /// `true` if the view has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allowed.ones().next().is_none()
    }

    /// Nodes of the view in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.allowed.ones().map(NodeIndex::new)
    }

    /// Copy of this view with `node` removed.
    #[must_use]
    pub fn without(&self, node: NodeIndex) -> Self {
        let mut next = self.clone();
        next.remove(node);
        next
    }

    /// Copy of this view with `node` added back.
    #[must_use]
    pub fn with(&self, node: NodeIndex) -> Self {
        let mut next = self.clone();
        next.insert(node);
        next
    }

    /// Copy of this view with every node in `nodes` removed.
    #[must_use]
    pub fn excluding(&self, nodes: impl IntoIterator<Item = NodeIndex>) -> Self {
        let mut next = self.clone();
        for node in nodes {
            next.remove(node);
        }
        next
    }

    /// Intersection of two views over the same graph.
    ///
    /// # Panics
    ///
    /// Panics if the views belong to different graphs.
    #[must_use]
    pub fn restrict(&self, other: &SubgraphView<'_>) -> Self {
        assert!(
            std::ptr::eq(self.graph, other.graph),
            "cannot intersect views over different graphs"
        );
        let mut allowed = self.allowed.clone();
        allowed.intersect_with(&other.allowed);
        Self {
            graph: self.graph,
            allowed,
        }
    }

    /// Out-neighbours of `node` that lie inside the view.
    pub fn successors(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.graph
            .successors(node)
            .filter(|(n, _)| self.allowed.contains(n.index()))
    }

    /// In-neighbours of `node` that lie inside the view.
    pub fn predecessors(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.graph
            .predecessors(node)
            .filter(|(n, _)| self.allowed.contains(n.index()))
    }

    fn insert(&mut self, node: NodeIndex) {
        if node.index() < self.allowed.len() {
            self.allowed.insert(node.index());
        }
    }

    fn remove(&mut self, node: NodeIndex) {
        if node.index() < self.allowed.len() {
            self.allowed.set(node.index(), false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> InfluenceGraph {
        InfluenceGraph::from_edges([("a", "b", 0.5), ("b", "c", 0.5), ("a", "c", 0.5)])
            .expect("build")
    }

    #[test]
    fn full_view_contains_everything() {
        let g = chain();
        let v = g.full_view();
        assert_eq!(v.len(), 3);
        assert!(g.nodes().all(|n| v.contains(n)));
    }

    #[test]
    fn without_filters_neighbours() {
        let g = chain();
        let a = g.node_index("a").expect("a");
        let b = g.node_index("b").expect("b");
        let c = g.node_index("c").expect("c");

        let v = g.full_view().without(b);
        assert!(!v.contains(b));
        let succ: Vec<_> = v.successors(a).map(|(n, _)| n).collect();
        assert_eq!(succ, vec![c]);
        assert_eq!(v.predecessors(c).count(), 1);

        // The original view is untouched.
        assert!(g.full_view().contains(b));
        assert!(v.with(b).contains(b));
    }

    #[test]
    fn restrict_is_intersection() {
        let g = chain();
        let a = g.node_index("a").expect("a");
        let b = g.node_index("b").expect("b");
        let c = g.node_index("c").expect("c");

        let ab = g.view_of([a, b]);
        let bc = g.view_of([b, c]);
        let both = ab.restrict(&bc);
        assert_eq!(both.nodes().collect::<Vec<_>>(), vec![b]);

        let none = both.excluding([b]);
        assert!(none.is_empty());
    }

    #[test]
    fn out_of_range_indices_ignored() {
        let g = chain();
        let v = g.view_of([NodeIndex::new(99)]);
        assert!(v.is_empty());
        assert!(!v.with(NodeIndex::new(99)).contains(NodeIndex::new(99)));
    }
}
