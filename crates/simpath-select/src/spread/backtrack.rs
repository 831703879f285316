//! Pruned simple-path enumeration from a single root.
//!
//! # Algorithm
//!
//! Depth-first walk over simple paths starting at `root`, with an explicit
//! heap stack instead of recursion:
//!
//! ```text
//! pp  = 1, spd = 1, stack = [root]
//! loop:
//!   x = top(stack)
//!   next unexplored successor y of x (in view, not on path):
//!     if pp * w(x, y) < tol  → prune y for this frame
//!     else                   → push y, pp *= w, spd += pp
//!   no successor left        → pop x, restore pp saved when x was pushed
//! ```
//!
//! Every push strictly extends a simple path (no node repeats on the stack),
//! so the walk terminates on cyclic graphs too.
//!
//! # Observers
//!
//! An observer `v` accumulates the path probability of every live path that
//! does not contain `v`. A path is credited at most once per observer, and
//! never once the observer sits on it. Accumulators are seeded with the
//! root's own 1, so `observed[v]` is the spread of the root inside
//! `view − v`, summed in the same order a walk over `view − v` would sum it
//! and therefore bit-identical to that walk's `spread`.

use fixedbitset::FixedBitSet;
use simpath_core::{NodeId, SimpathError, SubgraphView};
use tracing::{trace, warn};

/// One stack frame of the walk.
#[derive(Debug)]
struct Frame {
    node: NodeId,
    /// Path probability before this node was pushed.
    pp_before: f64,
    /// Successors inside the view, consumed left to right.
    successors: Vec<(NodeId, f64)>,
    cursor: usize,
}

impl Frame {
    fn new(view: &SubgraphView<'_>, node: NodeId, pp_before: f64) -> Self {
        Self {
            node,
            pp_before,
            successors: view.successors(node).collect(),
            cursor: 0,
        }
    }
}

/// Output of a single enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEnumeration {
    /// Estimated spread of the root (root counted as 1).
    pub spread: f64,
    /// Spread of the root inside `view − observers[i]`, aligned with the
    /// observer slice passed in.
    pub observed: Vec<f64>,
    /// Number of pushes performed.
    pub steps: u64,
}

impl PathEnumeration {
    /// Spread of the root inside `view − observers[i]`.
    #[must_use]
    pub fn spread_without(&self, i: usize) -> f64 {
        self.observed[i]
    }
}

/// Enumerate pruned simple paths from `root` inside `view`.
///
/// `root` is always counted, even if the view excludes it.
///
/// # Errors
///
/// Returns [`SimpathError::StepBudgetExceeded`] when `max_steps` is set and
/// the walk pushes more nodes than allowed.
pub fn backtrack(
    root: NodeId,
    tol: f64,
    view: &SubgraphView<'_>,
    observers: &[NodeId],
    max_steps: Option<u64>,
) -> Result<PathEnumeration, SimpathError> {
    let mut on_path = FixedBitSet::with_capacity(view.graph().node_count());
    on_path.insert(root.index());

    let mut stack = vec![Frame::new(view, root, 1.0)];
    let mut pp = 1.0_f64;
    let mut spd = 1.0_f64;
    let mut observed = vec![1.0_f64; observers.len()];
    let mut steps = 0_u64;

    while let Some(top) = stack.last_mut() {
        let Some(&(next, weight)) = top.successors.get(top.cursor) else {
            // Exhausted: backtrack and undo the edge that led here.
            if let Some(frame) = stack.pop() {
                on_path.set(frame.node.index(), false);
                pp = frame.pp_before;
            }
            continue;
        };
        top.cursor += 1;

        if on_path.contains(next.index()) {
            continue;
        }

        let candidate = pp * weight;
        if weight <= 0.0 || candidate < tol {
            trace!(node = next.index(), candidate, "pruned");
            continue;
        }

        steps += 1;
        if let Some(max) = max_steps.filter(|&max| steps > max) {
            let root_label = view.graph().label(root).unwrap_or("?").to_string();
            warn!(root = %root_label, max, "path enumeration step budget exhausted");
            return Err(SimpathError::StepBudgetExceeded {
                root: root_label,
                max_steps: max,
            });
        }

        on_path.insert(next.index());
        stack.push(Frame::new(view, next, pp));
        pp = candidate;
        spd += pp;

        for (acc, obs) in observed.iter_mut().zip(observers) {
            if !on_path.contains(obs.index()) {
                *acc += pp;
            }
        }
    }

    Ok(PathEnumeration {
        spread: spd,
        observed,
        steps,
    })
}
