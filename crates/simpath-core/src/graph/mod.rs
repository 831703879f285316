//! Influence graph module.
//!
//! # Overview
//!
//! The graph is built once from a weighted edge list and shared read-only by
//! every spread evaluation in a selection run.
//!
//! ```text
//! (source, target, weight) edge list
//!        ↓  model::InfluenceGraph::from_edges()
//! InfluenceGraph (petgraph DiGraph, nodes in label order)
//!        ↓  full_view() / view_of() / without() / restrict()
//! SubgraphView (bit mask over nodes, no edge copies)
//! ```
//!
//! ## Typical Usage
//!
//! ```rust
//! use simpath_core::graph::InfluenceGraph;
//!
//! let g = InfluenceGraph::from_edges([("a", "b", 0.5), ("b", "c", 0.25)])?;
//! let a = g.node_index("a").expect("a is a node");
//! let rest = g.full_view().without(a);
//! assert_eq!(rest.len(), 2);
//! # Ok::<(), simpath_core::SimpathError>(())
//! ```

pub mod model;
pub mod view;

pub use model::InfluenceGraph;
pub use view::SubgraphView;

/// Dense node handle used throughout the workspace.
pub type NodeId = petgraph::graph::NodeIndex;
