//! Rank-ordered index over candidate gains.
//!
//! Candidates are kept in a `BTreeSet` keyed by `(gain desc, node asc)`, so
//! the best candidate is always `first()` and re-ranking a candidate after a
//! recomputation is a remove plus an insert, both `O(log n)`.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use simpath_core::NodeId;

/// Ordering key: larger gain first, then lower node id.
#[derive(Debug, Clone, Copy)]
pub struct RankKey {
    pub gain: f64,
    pub node: NodeId,
}

impl PartialEq for RankKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankKey {}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .gain
            .total_cmp(&self.gain)
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Candidates ordered by current (possibly stale) gain.
#[derive(Debug, Default)]
pub struct RankIndex {
    keys: BTreeSet<RankKey>,
}

impl RankIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a candidate. Returns `false` if the exact key already exists.
    pub fn insert(&mut self, node: NodeId, gain: f64) -> bool {
        self.keys.insert(RankKey { gain, node })
    }

    /// Remove and return the best candidate.
    pub fn pop_best(&mut self) -> Option<RankKey> {
        self.keys.pop_first()
    }

    /// Best candidate without removing it.
    #[must_use]
    pub fn peek_best(&self) -> Option<&RankKey> {
        self.keys.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_gain_first_then_lower_id() {
        let mut idx = RankIndex::new();
        idx.insert(NodeId::new(3), 1.0);
        idx.insert(NodeId::new(1), 2.5);
        idx.insert(NodeId::new(0), 1.0);
        idx.insert(NodeId::new(2), 2.5);

        let order: Vec<usize> = std::iter::from_fn(|| idx.pop_best())
            .map(|k| k.node.index())
            .collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn reinsert_after_recompute() {
        let mut idx = RankIndex::new();
        idx.insert(NodeId::new(0), 5.0);
        idx.insert(NodeId::new(1), 4.0);

        let top = idx.pop_best().expect("non-empty");
        assert_eq!(top.node.index(), 0);
        // Gain shrinks on recompute; node 1 takes over.
        idx.insert(top.node, 3.0);
        assert_eq!(idx.peek_best().map(|k| k.node.index()), Some(1));
        assert_eq!(idx.len(), 2);
    }
}
