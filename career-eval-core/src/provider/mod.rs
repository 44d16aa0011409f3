//! # Model Provider
//!
//! The seam between the evaluation service and an external text-completion
//! API. A provider takes an ordered list of role-tagged messages and returns
//! a single text completion. It performs exactly one upstream call per
//! [`ModelProvider::complete`]; retry policy, if any, is the caller's concern
//! and the evaluation service uses none.
//!
//! * [`openai_chat::OpenAIChatProvider`]: OpenAI-compatible chat completions

pub mod openai_chat;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_completion_tokens: u32,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub metadata: ResponseMetadata,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// True when the provider stopped because it hit the token ceiling.
    pub fn is_truncated(&self) -> bool {
        self.metadata.finish_reason.as_deref() == Some("length")
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResponseMetadata {
    pub model: String,
    pub token_usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
}

/// (prompt tokens, completion tokens)
pub type TokenUsage = (u32, u32);

#[derive(Debug, Error)]
pub enum ProviderError {
    /// No credential available; not recoverable by retrying.
    #[error("{reason}")]
    NotConfigured { reason: String, hint: String },

    /// The provider answered with an error it described itself.
    #[error("{message}")]
    Api {
        message: String,
        details: Option<Value>,
    },

    #[error("{0}")]
    Transport(String),

    #[error("Model provider did not respond within {0:?}")]
    Timeout(Duration),

    #[error("No response content")]
    EmptyResponse,
}

impl ProviderError {
    /// Structured error body reported by the provider, if any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Api { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Fails with [`ProviderError::NotConfigured`] when no credential is set.
    fn ensure_configured(&self) -> ProviderResult<()>;

    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_messages() {
        let err = ProviderError::Api {
            message: "Incorrect API key provided".to_string(),
            details: Some(json!({"code": "invalid_api_key"})),
        };
        assert_eq!(err.to_string(), "Incorrect API key provided");
        assert_eq!(err.details(), Some(&json!({"code": "invalid_api_key"})));

        let err = ProviderError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
        assert!(err.details().is_none());
    }

    #[test]
    fn test_truncation_flag() {
        let mut completion = Completion::text("Score: 10");
        assert!(!completion.is_truncated());
        completion.metadata.finish_reason = Some("length".to_string());
        assert!(completion.is_truncated());
    }
}
