use axum::{extract::State, http::StatusCode, response::Json};
use chrono::SecondsFormat;

use crate::{models::HealthResponse, server::AppState};

/// Liveness probe
///
/// Reports that the process is serving and how many sessions it holds.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn get_status(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = state.service.registry();
    Json(HealthResponse {
        message: "Career Evaluator is running!".to_string(),
        status: "healthy".to_string(),
        timestamp: registry
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        active_sessions: registry.len(),
    })
}

/// Health check endpoint for container health monitoring
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
