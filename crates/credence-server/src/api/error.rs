use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use credence::{ErrorInfo, JobQueryError, JobState};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected before a job was created (bad name, wrong type, bad size).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("screenshot not found: {0}")]
    ScreenshotNotFound(String),

    #[error("job not found: {0}")]
    JobNotFound(uuid::Uuid),

    #[error("job {id} is not complete (state: {state})")]
    JobNotComplete { id: uuid::Uuid, state: JobState },

    #[error("job {id} failed")]
    JobFailed { id: uuid::Uuid, error: ErrorInfo },

    #[error("job {id} can no longer be cancelled (state: {state})")]
    NotCancellable { id: uuid::Uuid, state: JobState },

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<JobQueryError> for ApiError {
    fn from(e: JobQueryError) -> Self {
        match e {
            JobQueryError::NotFound(id) => ApiError::JobNotFound(id),
            JobQueryError::NotComplete { id, state } => ApiError::JobNotComplete { id, state },
            JobQueryError::Failed { id, error } => ApiError::JobFailed { id, error },
            JobQueryError::NotCancellable { id, state } => ApiError::NotCancellable { id, state },
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorInfo>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::ScreenshotNotFound(_) => (StatusCode::NOT_FOUND, None),
            ApiError::JobNotFound(_) => (StatusCode::NOT_FOUND, None),
            ApiError::JobNotComplete { .. } => (StatusCode::CONFLICT, None),
            // A failed job's stored attribution is surfaced verbatim.
            ApiError::JobFailed { error, .. } => (StatusCode::BAD_GATEWAY, Some(error.clone())),
            ApiError::NotCancellable { .. } => (StatusCode::CONFLICT, None),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
            detail,
        });

        (status, body).into_response()
    }
}
