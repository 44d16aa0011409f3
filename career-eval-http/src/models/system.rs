use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness response for `GET /`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub message: String,

    /// Always `healthy` while the process serves requests
    pub status: String,

    /// RFC 3339 timestamp
    pub timestamp: String,

    /// Number of sessions currently held in memory
    pub active_sessions: usize,
}
