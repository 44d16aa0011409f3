//! Error handling for career-eval-http
//!
//! Every failure leaving a handler becomes an [`AppError`], which renders a
//! JSON [`ErrorResponse`] carrying the session id when one is known.

use std::any::Any;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use career_eval_core::{EvaluationError, ParseFailure, SessionId};
use tracing::error;

use crate::models::ErrorResponse;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Evaluation failed for the given session
    Evaluation {
        error: EvaluationError,
        session_id: SessionId,
    },

    /// No such session, or it has expired
    SessionNotFound { session_id: SessionId },

    /// Anything else: malformed bodies, panics
    Internal {
        details: String,
        session_id: Option<SessionId>,
    },
}

impl AppError {
    pub fn evaluation(error: EvaluationError, session_id: impl Into<SessionId>) -> Self {
        Self::Evaluation {
            error,
            session_id: session_id.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Evaluation {
                error: EvaluationError::MissingInput,
                ..
            } => StatusCode::BAD_REQUEST,
            Self::Evaluation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ErrorResponse {
        match self {
            Self::Evaluation { error, session_id } => evaluation_body(error, session_id),
            Self::SessionNotFound { session_id } => {
                ErrorResponse::new("Session not found").session_id(Some(session_id))
            }
            Self::Internal {
                details,
                session_id,
            } => ErrorResponse::new("Internal server error")
                .details(details)
                .session_id(session_id),
        }
    }
}

fn evaluation_body(error: EvaluationError, session_id: SessionId) -> ErrorResponse {
    let session_id = Some(session_id);
    match error {
        EvaluationError::MissingInput => {
            ErrorResponse::new("Missing answers").session_id(session_id)
        }
        EvaluationError::Configuration { message, details } => ErrorResponse::new(message)
            .details(details)
            .session_id(session_id),
        EvaluationError::UpstreamTransport { message, details } => ErrorResponse {
            raw: details,
            ..ErrorResponse::new("Failed to evaluate answers")
                .details(message)
                .session_id(session_id)
        },
        EvaluationError::ProtocolViolation { reason, raw_text } => {
            let (error, details) = match reason {
                ParseFailure::NoMatch => (
                    "Failed to parse AI response",
                    "Could not extract score and explanation from the response",
                ),
                ParseFailure::InvalidScore { .. } => (
                    "Invalid score",
                    "The AI model returned an invalid score value",
                ),
            };
            ErrorResponse {
                raw_response: Some(raw_text),
                ..ErrorResponse::new(error)
                    .details(details)
                    .session_id(session_id)
            }
        }
    }
}

impl PartialEq<StatusCode> for AppError {
    fn eq(&self, status_code: &StatusCode) -> bool {
        &self.status_code() == status_code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Self::Internal {
            details,
            session_id,
        } = &self
        {
            error!(?session_id, %details, "Unhandled error");
        }

        (status, Json(self.into_body())).into_response()
    }
}

/// Response for a handler that panicked.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "Unknown panic".to_string()
    };

    AppError::Internal {
        details,
        session_id: None,
    }
    .into_response()
}
