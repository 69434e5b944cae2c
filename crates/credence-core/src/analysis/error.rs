use thiserror::Error;

use crate::gateway::GatewayError;
use crate::storage::StorageError;

/// Failure of one analysis stage, classified for the retry policy.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The model answered with JSON that does not match the stage's schema.
    /// Never retried.
    #[error("malformed model output: {0}")]
    MalformedModelOutput(String),

    /// The stage input itself is unusable (e.g. a truncated screenshot).
    /// Never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StageError {
    /// Returns `true` if retrying the stage could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StageError::Gateway(e) => e.is_transient(),
            StageError::Storage(e) => e.is_transient(),
            StageError::MalformedModelOutput(_) | StageError::InvalidInput(_) => false,
        }
    }

    /// Short machine-readable classification, recorded in job error info.
    pub fn kind(&self) -> &'static str {
        match self {
            StageError::Gateway(GatewayError::Timeout { .. }) => "gateway_timeout",
            StageError::Gateway(GatewayError::Unavailable(_)) => "gateway_unavailable",
            StageError::Gateway(GatewayError::MalformedResponse(_)) => "gateway_malformed",
            StageError::Storage(StorageError::ObjectNotFound { .. }) => "object_not_found",
            StageError::Storage(_) => "storage",
            StageError::MalformedModelOutput(_) => "malformed_model_output",
            StageError::InvalidInput(_) => "invalid_input",
        }
    }
}
