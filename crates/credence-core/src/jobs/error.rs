use thiserror::Error;
use uuid::Uuid;

use super::types::{ErrorInfo, JobState};

/// Caller-facing errors from registry queries. Never pipeline-internal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobQueryError {
    #[error("job not found: {0}")]
    NotFound(Uuid),

    #[error("job {id} is not complete (state: {state})")]
    NotComplete { id: Uuid, state: JobState },

    /// The job failed; the stored attribution is surfaced verbatim.
    #[error("job {id} failed: {error}")]
    Failed { id: Uuid, error: ErrorInfo },

    /// Cancellation was requested at or past the point of no return.
    #[error("job {id} can no longer be cancelled (state: {state})")]
    NotCancellable { id: Uuid, state: JobState },
}

/// Errors from state-machine transitions. An `Invalid` result against a
/// terminal state is how a cancelled job's task learns to abandon.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("job not found: {0}")]
    NotFound(Uuid),

    #[error("illegal transition {from} -> {to} for job {id}")]
    Invalid {
        id: Uuid,
        from: JobState,
        to: JobState,
    },
}
