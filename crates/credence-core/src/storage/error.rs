use thiserror::Error;

/// Errors surfaced by an [`ObjectStore`](super::ObjectStore) implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested object does not exist. Permanent, never retried.
    #[error("object not found: {container}/{name}")]
    ObjectNotFound { container: String, name: String },

    /// The container does not exist or cannot be read.
    #[error("container not found: {container}")]
    ContainerNotFound { container: String },

    /// Transient I/O failure. Retryable.
    #[error("I/O error: {0}")]
    Io(String),

    /// A write could not be completed. Retryable.
    #[error("write failed: {container}/{name}: {message}")]
    WriteFailed {
        container: String,
        name: String,
        message: String,
    },
}

impl StorageError {
    /// Returns `true` if retrying the operation could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::ObjectNotFound { .. } | StorageError::ContainerNotFound { .. } => false,
            StorageError::Io(_) | StorageError::WriteFailed { .. } => true,
        }
    }
}
