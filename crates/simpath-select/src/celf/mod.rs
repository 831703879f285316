//! Lazy-greedy (CELF++) seed selection.
//!
//! # Overview
//!
//! Naive greedy re-evaluates every candidate in every round. CELF++ keeps
//! each candidate's last gain in a rank index and re-evaluates only the
//! current top, relying on submodularity: a gain measured against a smaller
//! seed set can only shrink as seeds are added. A second look-ahead gain
//! (`mg2`, measured as if the round's current best were already a seed)
//! lets the next round skip the estimator entirely when that best node is
//! the one accepted.
//!
//! The selected sequence is identical to [`crate::greedy::greedy_select`] on
//! the same inputs, including the lowest-id tie-break.

pub mod queue;
pub mod selector;

pub use queue::{RankIndex, RankKey};
pub use selector::{CandidateRecord, celf_select, celf_select_with_partition};
