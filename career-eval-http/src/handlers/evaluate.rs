use axum::{body::Bytes, extract::State, response::Json};
use career_eval_core::Profile;

use crate::{
    error::AppError,
    extract::{SessionIdHeader, resolve_session_id},
    models::{ErrorResponse, EvaluateRequest, EvaluateResponse},
    server::AppState,
};

/// Evaluate a career profile
///
/// Sends the answers to the model provider and returns the risk score.
/// The session id comes from the `X-Session-ID` header, then the body,
/// then defaults to `anonymous`.
#[utoipa::path(
    post,
    path = "/evaluate",
    request_body = EvaluateRequest,
    responses(
        (status = 200, description = "Evaluation completed", body = EvaluateResponse),
        (status = 400, description = "Missing answers", body = ErrorResponse),
        (status = 500, description = "Configuration, provider or parsing failure", body = ErrorResponse)
    ),
    params(
        ("X-Session-ID" = Option<String>, Header, description = "Client-chosen session identifier")
    )
)]
pub async fn evaluate(
    State(state): State<AppState>,
    SessionIdHeader(header_session_id): SessionIdHeader,
    body: Bytes,
) -> Result<Json<EvaluateResponse>, AppError> {
    let request = EvaluateRequest::from_body(&body).map_err(|e| AppError::Internal {
        details: e.to_string(),
        session_id: Some(resolve_session_id(header_session_id.as_deref(), None)),
    })?;

    let session_id = resolve_session_id(
        header_session_id.as_deref(),
        request.session_id.as_deref(),
    );
    let profile = Profile::from_answers(request.answers);

    let evaluation = state
        .service
        .evaluate(profile.as_ref(), &session_id)
        .await
        .map_err(|error| AppError::evaluation(error, session_id))?;

    Ok(Json(evaluation.into()))
}
