use crate::handlers;
use crate::models::{
    ErrorResponse, EvaluateRequest, EvaluateResponse, HealthResponse, SessionResponse,
};
use crate::server::AppState;
use axum::{
    Json, Router,
    routing::{get, post},
};
use career_eval_core::{EvaluationResult, SessionStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::system::get_status,
        handlers::evaluate::evaluate,
        handlers::session::get_session
    ),
    components(schemas(
        EvaluateRequest,
        EvaluateResponse,
        SessionResponse,
        HealthResponse,
        ErrorResponse,
        EvaluationResult,
        SessionStatus
    ))
)]
pub struct ApiDoc;

/// Create the main API router with state
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_status))
        .route("/health", get(handlers::health_check))
        .route("/evaluate", post(handlers::evaluate))
        .route("/session/{session_id}", get(handlers::get_session))
        .route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
