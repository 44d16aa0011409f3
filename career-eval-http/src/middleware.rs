use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{
    error::AppError,
    extract::{header_session_id, resolve_session_id},
    models::EvaluateRequest,
    server::AppState,
};

/// Largest body buffered for logging; matches axum's default extractor limit.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Logs every request with its session id and the live session count.
///
/// The session id is resolved like the evaluate handler does: header, then a
/// `sessionId` field in a JSON body, then `anonymous`. The body is buffered
/// and handed on unchanged.
pub async fn log_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let header_id = header_session_id(&parts.headers);

    let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return AppError::Internal {
                details: err.to_string(),
                session_id: header_id,
            }
            .into_response();
        }
    };

    let session_id = resolve_session_id(header_id.as_deref(), body_session_id(&bytes).as_deref());
    debug!(
        method = %parts.method,
        path = %parts.uri.path(),
        session_id = %session_id,
        active_sessions = state.service.registry().len(),
        "Incoming request"
    );

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn body_session_id(bytes: &Bytes) -> Option<String> {
    EvaluateRequest::from_body(bytes)
        .ok()
        .and_then(|request| request.session_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_session_id() {
        assert_eq!(
            body_session_id(&Bytes::from_static(br#"{"sessionId": "abc"}"#)).as_deref(),
            Some("abc")
        );
        assert_eq!(
            body_session_id(&Bytes::from_static(br#"{"sessionId": 7}"#)).as_deref(),
            Some("7")
        );
        assert!(body_session_id(&Bytes::new()).is_none());
        assert!(body_session_id(&Bytes::from_static(b"{not json")).is_none());
    }
}
