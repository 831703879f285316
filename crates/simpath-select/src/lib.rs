#![forbid(unsafe_code)]
//! simpath-select library.
//!
//! SimPath influence-spread estimation and greedy seed selection over an
//! [`InfluenceGraph`](simpath_core::InfluenceGraph).
//!
//! # Conventions
//!
//! - **Errors**: Every fallible operation returns
//!   [`SimpathError`](simpath_core::SimpathError).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Determinism**: Candidates are scanned in node-index order, which is
//!   label order, so ties always resolve to the lowest label.
//!
//! # Modules
//!
//! - [`spread`]: path enumeration and seed-set spread.
//! - [`cover`]: vertex-cover partition for the first round of gains.
//! - [`celf`]: CELF++ lazy-greedy selection.
//! - [`greedy`]: full-recompute greedy reference selector.

pub mod celf;
pub mod cover;
pub mod greedy;
pub mod selection;
pub mod spread;

pub use celf::{celf_select, celf_select_with_partition};
pub use cover::{EstimateSource, InitialEstimate, InitialEstimates, VertexCoverPartition};
pub use greedy::greedy_select;
pub use selection::{SeedSelection, SelectionStats};
pub use spread::{PathEnumeration, SeedBaseline, SpreadEstimator, backtrack, estimate_spread};
