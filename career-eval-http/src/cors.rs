//! Cross-origin policy for the browser front end.
//!
//! Development allows any loopback or `192.168.x.y` origin with an explicit
//! port, so the UI can be opened from a phone on the same network. Both
//! environments accept the configured allow-list. A request from any other
//! origin is failed by [`reject_disallowed_origin`] before it reaches a handler.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use regex::Regex;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    error::AppError,
    extract::{SESSION_ID_HEADER, header_session_id},
};

lazy_static! {
    static ref LOCAL_NETWORK_ORIGIN: Regex =
        Regex::new(r"^http://192\.168\.\d+\.\d+:\d+$").unwrap();
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    pub environment: Environment,
    pub allowed_origins: Vec<String>,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl CorsPolicy {
    pub fn allows(&self, origin: &str) -> bool {
        if self.environment == Environment::Development && is_local_origin(origin) {
            return true;
        }
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    pub fn layer(&self) -> CorsLayer {
        let policy = self.clone();
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _parts: &Parts| {
                    origin.to_str().is_ok_and(|origin| policy.allows(origin))
                },
            ))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([
                CONTENT_TYPE,
                AUTHORIZATION,
                HeaderName::from_static(SESSION_ID_HEADER),
            ])
            .allow_credentials(true)
    }
}

/// Fails requests from an origin the policy does not allow before they reach
/// a handler. Requests without an `Origin` header pass.
pub async fn reject_disallowed_origin(
    State(policy): State<CorsPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let allowed = match request.headers().get(ORIGIN) {
        None => true,
        Some(origin) => origin.to_str().is_ok_and(|origin| policy.allows(origin)),
    };
    if allowed {
        return next.run(request).await;
    }

    AppError::Internal {
        details: "Not allowed by CORS".to_string(),
        session_id: header_session_id(request.headers()),
    }
    .into_response()
}

fn is_local_origin(origin: &str) -> bool {
    origin.starts_with("http://localhost:")
        || origin.starts_with("http://127.0.0.1:")
        || LOCAL_NETWORK_ORIGIN.is_match(origin)
}
