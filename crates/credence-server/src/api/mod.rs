//! HTTP API (Axum) for submitting and observing analysis jobs.

pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use handler::{
    cancel_handler, report_handler, reports_handler, screenshots_handler, status_handler,
    submit_handler, summary_handler,
};
pub use state::{AppState, GatewayMode};

pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/v1/analyses", post(submit_handler).get(summary_handler))
        .route(
            "/v1/analyses/{id}",
            get(status_handler).delete(cancel_handler),
        )
        .route("/v1/analyses/{id}/report", get(report_handler))
        .route("/v1/reports", get(reports_handler))
        .route("/v1/screenshots", get(screenshots_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub storage: &'static str,
    pub gateway_mode: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let storage_status = if state.storage_path.exists() && state.storage_path.is_dir() {
        "ready"
    } else {
        "pending"
    };

    let components = ComponentStatus {
        http: "ready",
        storage: storage_status,
        gateway_mode: state.gateway_mode.as_str(),
    };

    let is_ready = components.storage == "ready";
    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    (
        status_code,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
