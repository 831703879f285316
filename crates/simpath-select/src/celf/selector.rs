//! CELF++ lazy-greedy seed selection.
//!
//! # Algorithm
//!
//! Each candidate carries `mg1` (gain w.r.t. the seeds when it was last
//! evaluated), `mg2` (gain w.r.t. those seeds plus `prev_best`) and the round
//! in which both were computed. Submodularity makes every stale `mg1` an
//! upper bound of the current gain, so only the top of the rank index ever
//! needs attention:
//!
//! ```text
//! x = top
//! if x validated this round            → accept x
//! elif x.prev_best == last seed and
//!      x validated last round          → mg1 = mg2   (no estimator call)
//! else                                 → mg1 = Δ_x(S)
//!                                        prev_best = cur_best
//!                                        mg2 = Δ_x(S + cur_best)
//! mark x validated, update cur_best, reinsert x
//! ```
//!
//! `cur_best` is the best candidate validated so far in the current round.
//!
//! # Look-ahead
//!
//! A recompute takes up to [`SelectionConfig::lookahead`] candidates off the
//! top of the index at once: the popped node plus every queued node behind it
//! that is neither validated this round nor `mg2`-reusable. The whole batch is
//! priced with [`SpreadEstimator::lookahead_gains`], one walk per seed, and
//! every member is validated and reinserted. The gains are exact, so a larger
//! batch only trades walks for possibly wasted work on candidates that never
//! reach the top again.
//!
//! # Initial Round
//!
//! First-round gains are single-node spreads from the
//! [`VertexCoverPartition`]. Values that came from the free-node recurrence
//! are upper bounds rather than exact gains, so they enter the index
//! unvalidated and get recomputed if they ever reach the top.

use std::collections::HashMap;

use simpath_core::{InfluenceGraph, NodeId, SelectionConfig, SimpathError};
use tracing::{debug, info, instrument, trace, warn};

use crate::celf::queue::RankIndex;
use crate::cover::VertexCoverPartition;
use crate::selection::{SeedSelection, SelectionStats, resolve_candidates};
use crate::spread::{SeedBaseline, SpreadEstimator};

/// Lazy-evaluation state for one not-yet-selected node.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    /// Gain w.r.t. the seed set of `validated_round` (or an upper bound).
    pub mg1: f64,
    /// Gain w.r.t. that seed set plus `prev_best`.
    pub mg2: Option<f64>,
    /// The node `mg2` assumes was added.
    pub prev_best: Option<NodeId>,
    /// Seed-set size when `mg1` was last computed exactly.
    pub validated_round: Option<usize>,
}

/// Select `k` seeds with CELF++ over SimPath spread estimates.
///
/// Uses the local-ratio vertex cover for the initial round.
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
/// Lazy evaluation trusts that a stale gain bounds the current one, which
/// holds when the estimate is submodular. That needs linear-threshold
/// weights (see [`InfluenceGraph::is_linear_threshold`]). On other graphs
/// the selection may differ from [`crate::greedy_select`] and can accept
/// seeds with negative gain; both cases are logged at `warn`.
pub fn celf_select(
    graph: &InfluenceGraph,
    config: &SelectionConfig,
    k: usize,
    pool: Option<&[&str]>,
) -> Result<SeedSelection, SimpathError> {
    let partition = VertexCoverPartition::compute(graph);
    celf_select_with_partition(graph, config, k, pool, &partition)
}

/// [`celf_select`] with a caller-supplied partition.
///
/// Lets callers compare cover strategies on the same graph.
///
/// # Errors
///
/// As [`celf_select`].
///
/// # Panics
///
/// Panics if the lazy-evaluation bookkeeping loses a candidate, which would
/// mean the selector's invariants are broken.
#[instrument(skip(graph, config, pool, partition), fields(nodes = graph.node_count()))]
pub fn celf_select_with_partition(
    graph: &InfluenceGraph,
    config: &SelectionConfig,
    k: usize,
    pool: Option<&[&str]>,
    partition: &VertexCoverPartition,
) -> Result<SeedSelection, SimpathError> {
    let Some(candidates) = resolve_candidates(graph, config, k, pool)? else {
        return Ok(SeedSelection::empty(graph));
    };
    let estimator = SpreadEstimator::new(graph, config)?;
    if !graph.is_linear_threshold() {
        warn!("incoming weights exceed 1; lazy selection may diverge from greedy");
    }

    if k == 0 {
        return Ok(SeedSelection::empty(graph));
    }
    let mut stats = SelectionStats::default();

    // -- Initial round ------------------------------------------------------

    let initial = partition.initial_estimates(&estimator, &candidates)?;
    stats.initial_enumerations = initial.enumerations;
    stats.cover_fallbacks = initial.fallbacks;

    let mut records: HashMap<NodeId, CandidateRecord> = HashMap::with_capacity(candidates.len());
    let mut index = RankIndex::new();
    for estimate in initial.estimates {
        records.insert(
            estimate.node,
            CandidateRecord {
                mg1: estimate.spread,
                mg2: None,
                prev_best: None,
                validated_round: estimate.exact.then_some(0),
            },
        );
        index.insert(estimate.node, estimate.spread);
    }

    // -- Lazy rounds --------------------------------------------------------

    let mut seeds: Vec<NodeId> = Vec::with_capacity(k);
    let mut gains: Vec<f64> = Vec::with_capacity(k);
    let mut baseline = estimator.baseline(&[])?;
    let mut last_seed: Option<NodeId> = None;
    let mut cur_best: Option<(NodeId, f64)> = None;
    // Baselines for `S + alt`, valid for the current round only.
    let mut alt_baselines: HashMap<NodeId, SeedBaseline> = HashMap::new();

    while seeds.len() < k {
        let round = seeds.len();
        let top = index
            .pop_best()
            .expect("rank index exhausted before k seeds were chosen");
        let node = top.node;
        let record = records
            .get_mut(&node)
            .expect("ranked candidate missing from the record pool");

        if record.validated_round == Some(round) {
            let gain = record.mg1;
            debug!(round, node = graph.label(node), gain, "seed accepted");
            if gain < 0.0 {
                warn!(
                    round,
                    node = graph.label(node),
                    gain,
                    "accepted seed lowers the estimated spread"
                );
            }
            gains.push(gain);
            seeds.push(node);
            records.remove(&node);

            baseline = estimator.baseline(&seeds)?;
            last_seed = Some(node);
            cur_best = None;
            alt_baselines.clear();
            continue;
        }

        if let Some(mg2) = record.mg2.filter(|_| mg2_is_current(record, round, last_seed)) {
            trace!(node = node.index(), mg2, "mg2 reused");
            record.mg1 = mg2;
            record.validated_round = Some(round);
            stats.mg2_reuses += 1;
            if cur_best.is_none_or(|(_, g)| mg2 > g) {
                cur_best = Some((node, mg2));
            }
            index.insert(node, mg2);
            continue;
        }

        // Recompute `node` together with the candidates queued right behind
        // it that would need an estimator call too.
        let mut batch = vec![node];
        while batch.len() < config.lookahead {
            let Some(next) = index.peek_best().map(|key| key.node) else {
                break;
            };
            let next_record = records
                .get(&next)
                .expect("ranked candidate missing from the record pool");
            if next_record.validated_round == Some(round)
                || mg2_is_current(next_record, round, last_seed)
            {
                break;
            }
            index.pop_best();
            batch.push(next);
        }

        let fresh = estimator.lookahead_gains(&baseline, &batch)?;
        stats.gain_evaluations += batch.len();
        stats.recomputations += batch.len();

        let alt = cur_best.map(|(n, _)| n);
        let mut with_alt: Vec<Option<f64>> = vec![None; batch.len()];
        if let Some(alt) = alt {
            if !alt_baselines.contains_key(&alt) {
                let mut alt_seeds = seeds.clone();
                alt_seeds.push(alt);
                alt_baselines.insert(alt, estimator.baseline(&alt_seeds)?);
            }
            let others: Vec<NodeId> = batch.iter().copied().filter(|&n| n != alt).collect();
            let mut values = estimator
                .lookahead_gains(&alt_baselines[&alt], &others)?
                .into_iter();
            stats.gain_evaluations += others.len();
            for (slot, &n) in with_alt.iter_mut().zip(&batch) {
                if n != alt {
                    *slot = values.next();
                }
            }
        }

        for ((&n, gain), mg2) in batch.iter().zip(fresh).zip(with_alt) {
            let record = records
                .get_mut(&n)
                .expect("ranked candidate missing from the record pool");
            record.mg1 = gain;
            record.mg2 = mg2;
            record.prev_best = mg2.and(alt);
            record.validated_round = Some(round);
            if cur_best.is_none_or(|(_, g)| gain > g) {
                cur_best = Some((n, gain));
            }
            index.insert(n, gain);
        }
    }

    info!(
        k,
        spread = baseline.total(),
        evaluations = stats.gain_evaluations,
        reuses = stats.mg2_reuses,
        "celf++ selection done"
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

/// `true` when `record.mg2` is exactly the gain against the current seeds:
/// it was computed last round against `S + prev_best`, and `prev_best` is the
/// seed accepted since.
fn mg2_is_current(record: &CandidateRecord, round: usize, last_seed: Option<NodeId>) -> bool {
    round > 0
        && record.mg2.is_some()
        && record.prev_best.is_some()
        && record.prev_best == last_seed
        && record.validated_round == Some(round - 1)
}
