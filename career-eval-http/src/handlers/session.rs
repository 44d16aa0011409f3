use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::{
    error::AppError,
    models::{ErrorResponse, SessionResponse},
    server::AppState,
};

/// Get session status
///
/// Returns the stored state of an evaluation request. Sessions idle for
/// longer than the retention window are no longer available.
#[utoipa::path(
    get,
    path = "/session/{session_id}",
    responses(
        (status = 200, description = "Session found", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("session_id" = String, Path, description = "Session identifier")
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .service
        .registry()
        .get(&session_id)
        .map_err(|_| AppError::SessionNotFound { session_id })?;

    Ok(Json(session.into()))
}
