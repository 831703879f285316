//! Full-recompute greedy seed selection.
//!
//! Every round evaluates the exact marginal gain of every remaining candidate
//! and takes the largest (lowest node id on ties). This is the reference the
//! lazy CELF++ selector must reproduce; it is `O(k · |candidates|)` estimator
//! calls and only practical on small graphs.

use simpath_core::{InfluenceGraph, NodeId, SelectionConfig, SimpathError};
use tracing::{debug, info, instrument, warn};

use crate::selection::{SeedSelection, SelectionStats, resolve_candidates};
use crate::spread::SpreadEstimator;

/// Select `k` seeds by naive greedy.
///
/// `pool` restricts which nodes may become seeds; spread is always measured
/// on the whole graph.
///
/// # Errors
///
/// - [`SimpathError::InvalidTolerance`] for a tolerance outside `(0, 1)`.
/// - [`SimpathError::InvalidArgument`] for a bad pool or config.
/// - [`SimpathError::InsufficientNodes`] when `k` exceeds the pool.
/// - [`SimpathError::StepBudgetExceeded`] if an enumeration hits the cap.
///
/// # Notes
///
/// Without linear-threshold weights a later seed can have negative gain;
/// greedy still takes the largest one and logs it at `warn`.
#[instrument(skip(graph, config, pool), fields(nodes = graph.node_count()))]
pub fn greedy_select(
    graph: &InfluenceGraph,
    config: &SelectionConfig,
    k: usize,
    pool: Option<&[&str]>,
) -> Result<SeedSelection, SimpathError> {
    let Some(mut remaining) = resolve_candidates(graph, config, k, pool)? else {
        return Ok(SeedSelection::empty(graph));
    };
    let estimator = SpreadEstimator::new(graph, config)?;

    let mut stats = SelectionStats::default();
    let mut baseline = estimator.baseline(&[])?;
    let mut seeds: Vec<NodeId> = Vec::with_capacity(k);
    let mut gains = Vec::with_capacity(k);

    while seeds.len() < k {
        let mut best: Option<(usize, f64)> = None;
        // `remaining` is ascending, so strict `>` keeps the lowest id on ties.
        for (pos, &node) in remaining.iter().enumerate() {
            let gain = estimator.marginal_gain(&baseline, node)?;
            stats.gain_evaluations += 1;
            if best.is_none_or(|(_, g)| gain > g) {
                best = Some((pos, gain));
            }
        }

        let (pos, gain) = best.expect("candidate pool holds at least k nodes");
        let node = remaining.remove(pos);
        debug!(round = seeds.len(), node = graph.label(node), gain, "seed accepted");
        if gain < 0.0 {
            warn!(
                round = seeds.len(),
                node = graph.label(node),
                gain,
                "accepted seed lowers the estimated spread"
            );
        }

        seeds.push(node);
        gains.push(gain);
        baseline = estimator.baseline(&seeds)?;
    }

    info!(
        k,
        spread = baseline.total(),
        evaluations = stats.gain_evaluations,
        "greedy selection done"
    );

    Ok(SeedSelection {
        seeds: graph.labels(&seeds),
        seed_ids: seeds,
        gains,
        spread: baseline.total(),
        graph_hash: graph.content_hash().to_string(),
        stats,
    })
}
