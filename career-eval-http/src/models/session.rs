use career_eval_core::{EvaluationResult, Session, SessionId, SessionStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `GET /session/{sessionId}`; times are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub status: SessionStatus,
    pub start_time: i64,
    pub last_activity: i64,
    pub result: Option<EvaluationResult>,
    pub error: Option<String>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id,
            status: session.status,
            start_time: session.created_at.timestamp_millis(),
            last_activity: session.last_activity_at.timestamp_millis(),
            result: session.result,
            error: session.error,
        }
    }
}
