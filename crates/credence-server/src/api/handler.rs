use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use credence::constants::{IMAGE_EXTENSIONS, MAX_SCREENSHOT_BYTES, MIN_SCREENSHOT_BYTES};
use credence::{JobSnapshot, JobState, ScreenshotRef, StorageError};

use crate::api::error::ApiError;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Object name of an already-uploaded screenshot.
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub state: JobState,
}

/// Submits a named screenshot for analysis. Input errors are rejected here,
/// before any job exists; the response never waits on the pipeline.
#[instrument(skip(state, request), fields(name = %request.name))]
pub async fn submit_handler(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Response, ApiError> {
    let name = request.name.trim();
    validate_screenshot_name(name)?;

    let bytes = state
        .store
        .fetch(&state.screenshot_container, name)
        .await
        .map_err(|e| match e {
            StorageError::ObjectNotFound { .. } | StorageError::ContainerNotFound { .. } => {
                ApiError::ScreenshotNotFound(name.to_string())
            }
            other => ApiError::Storage(other.to_string()),
        })?;

    if bytes.len() < MIN_SCREENSHOT_BYTES {
        return Err(ApiError::InvalidInput(format!(
            "'{name}' is {} bytes, too small to be a screenshot",
            bytes.len()
        )));
    }
    if bytes.len() > MAX_SCREENSHOT_BYTES {
        return Err(ApiError::InvalidInput(format!(
            "'{name}' is {} bytes, above the {MAX_SCREENSHOT_BYTES} byte limit",
            bytes.len()
        )));
    }

    let job_id = state
        .orchestrator
        .submit(ScreenshotRef::new(name, &state.screenshot_container));

    info!(%job_id, "analysis submitted");
    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            job_id,
            state: JobState::Pending,
        }),
    )
        .into_response())
}

/// Returns the status row for one job.
#[instrument(skip(state))]
pub async fn status_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobSnapshot>, ApiError> {
    Ok(Json(state.orchestrator.registry().snapshot(id)?))
}

/// Returns the completed report; the same JSON as the persisted object.
#[instrument(skip(state))]
pub async fn report_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let report = state.orchestrator.registry().result(id)?;
    Ok(Json(&*report).into_response())
}

/// Cancels a job that has not yet reached aggregation.
#[instrument(skip(state))]
pub async fn cancel_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobSnapshot>, ApiError> {
    state.orchestrator.registry().cancel(id)?;
    Ok(Json(state.orchestrator.registry().snapshot(id)?))
}

/// Returns totals per state plus all job rows.
#[instrument(skip(state))]
pub async fn summary_handler(State(state): State<AppState>) -> Response {
    Json(state.orchestrator.registry().summary()).into_response()
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub names: Vec<String>,
}

/// Lists persisted report objects.
#[instrument(skip(state))]
pub async fn reports_handler(State(state): State<AppState>) -> Result<Json<ListResponse>, ApiError> {
    let names = list_or_empty(&state, &state.report_container).await?;
    Ok(Json(ListResponse { names }))
}

/// Lists screenshots available for analysis.
#[instrument(skip(state))]
pub async fn screenshots_handler(
    State(state): State<AppState>,
) -> Result<Json<ListResponse>, ApiError> {
    let names = list_or_empty(&state, &state.screenshot_container).await?;
    let names = names
        .into_iter()
        .filter(|name| has_image_extension(name))
        .collect();
    Ok(Json(ListResponse { names }))
}

/// A container that does not exist yet simply has nothing in it.
async fn list_or_empty(state: &AppState, container: &str) -> Result<Vec<String>, ApiError> {
    match state.store.list(container).await {
        Ok(names) => Ok(names),
        Err(StorageError::ContainerNotFound { .. }) => Ok(Vec::new()),
        Err(e) => Err(ApiError::Storage(e.to_string())),
    }
}

pub(crate) fn validate_screenshot_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::InvalidInput("screenshot name is empty".to_string()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ApiError::InvalidInput(format!(
            "screenshot name '{name}' must be a bare object name"
        )));
    }
    if !has_image_extension(name) {
        return Err(ApiError::InvalidInput(format!(
            "'{name}' is not a supported image type (expected one of: {})",
            IMAGE_EXTENSIONS.join(", ")
        )));
    }
    Ok(())
}

pub(crate) fn has_image_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
