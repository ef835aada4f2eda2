//! Orchestrator error type (§7): only the "cannot continue" cases are
//! fatal. Every other failure kind in §7 is handled locally (logged,
//! contribution dropped, collaborator skipped) and never reaches here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A cluster without a leader in its own membership, or two clusters
    /// sharing an id — the clustering invariant (§3, §8) is violated.
    #[error("invariant violation in cluster {cluster_id}: {detail}")]
    InvariantViolation { cluster_id: String, detail: String },

    /// Every cluster must end up with exactly one advice (§3); this fires
    /// only if the waterfall's own fallback strategy is missing from the
    /// pipeline the caller supplied.
    #[error("cluster {cluster_id} has no advice after the strategy waterfall ran")]
    MissingAdvice { cluster_id: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
