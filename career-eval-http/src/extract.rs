use axum::{extract::FromRequestParts, http::request::Parts};
use career_eval_core::{ANONYMOUS_SESSION_ID, SessionId};
use std::convert::Infallible;

pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Session id carried in the `X-Session-ID` header, if any.
///
/// Never rejects; an absent, empty or non-UTF-8 header yields `None`.
#[derive(Debug, Clone, Default)]
pub struct SessionIdHeader(pub Option<SessionId>);

impl SessionIdHeader {
    pub fn from_parts(parts: &Parts) -> Self {
        Self(header_session_id(&parts.headers))
    }

    pub fn into_inner(self) -> Option<SessionId> {
        self.0
    }
}

impl<S> FromRequestParts<S> for SessionIdHeader
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

pub fn header_session_id(headers: &axum::http::HeaderMap) -> Option<SessionId> {
    headers
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Header first, then the body field, then [`ANONYMOUS_SESSION_ID`].
pub fn resolve_session_id(header: Option<&str>, body: Option<&str>) -> SessionId {
    header
        .filter(|id| !id.is_empty())
        .or(body.filter(|id| !id.is_empty()))
        .unwrap_or(ANONYMOUS_SESSION_ID)
        .to_string()
}
