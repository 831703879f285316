//! Domain errors shared by every simpath crate.
//!
//! All input validation happens before any spread computation starts, so a
//! caller either gets a complete seed selection or one of these errors, never
//! a partial result.

/// Errors raised while building a graph or running seed selection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimpathError {
    /// Self loop or duplicate `(source, target)` pair in the edge list.
    #[error("invalid edge {from} -> {to}: {reason}")]
    InvalidEdge {
        from: String,
        to: String,
        reason: &'static str,
    },

    /// Edge weight outside `(0, 1]` (or not a finite number).
    #[error("invalid weight {weight} on edge {from} -> {to}: must be in (0, 1]")]
    InvalidWeight {
        from: String,
        to: String,
        weight: f64,
    },

    /// Pruning tolerance outside `(0, 1)`.
    #[error("invalid pruning tolerance {0}: must be in (0, 1)")]
    InvalidTolerance(f64),

    /// A selection argument that cannot be honoured (e.g. unknown pool node).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// More seeds requested than there are candidates.
    #[error("requested {requested} seeds but only {available} candidate nodes exist")]
    InsufficientNodes { requested: usize, available: usize },

    /// A single enumeration exceeded the configured step cap.
    #[error("path enumeration from {root} exceeded the step budget of {max_steps}")]
    StepBudgetExceeded { root: String, max_steps: u64 },
}

/// Convenience alias used across the workspace.
pub type Result<T, E = SimpathError> = std::result::Result<T, E>;

/// Validate a pruning tolerance.
///
/// # Errors
///
/// Returns [`SimpathError::InvalidTolerance`] unless `tol` is finite and in
/// the open interval `(0, 1)`.
pub fn validate_tolerance(tol: f64) -> Result<()> {
    if tol.is_finite() && tol > 0.0 && tol < 1.0 {
        Ok(())
    } else {
        Err(SimpathError::InvalidTolerance(tol))
    }
}
