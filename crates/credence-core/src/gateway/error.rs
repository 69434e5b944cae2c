use thiserror::Error;

/// Errors surfaced by a [`ModelGateway`](super::ModelGateway) implementation.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The inference service could not be reached or refused the request.
    /// Retryable.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),

    /// The inference call exceeded the configured deadline. Retryable.
    #[error("gateway timeout after {seconds}s")]
    Timeout { seconds: u64 },

    /// The service answered, but not with parseable JSON. Retrying an
    /// ill-formed response rarely helps, so this is permanent.
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// Returns `true` if retrying the call could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Unavailable(_) | GatewayError::Timeout { .. } => true,
            GatewayError::MalformedResponse(_) => false,
        }
    }
}
