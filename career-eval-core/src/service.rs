//! # Evaluation Service
//!
//! Runs one evaluation request end to end:
//!
//! 1. reject a missing profile ([`EvaluationError::MissingInput`])
//! 2. reject an unconfigured provider ([`EvaluationError::Configuration`])
//! 3. register the session as `processing`
//! 4. send the system and user messages to the provider, bounded by
//!    [`EvaluatorConfig::request_timeout`]
//! 5. parse the completion and move the session to `completed` or `error`
//!
//! There are no retries and no caching; identical profiles produce two
//! upstream calls.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    config::EvaluatorConfig,
    prompt::{Profile, build_messages},
    protocol::{EvaluationResult, ParseFailure, ParseOutcome, parse_completion},
    provider::{Completion, CompletionRequest, ModelProvider, ProviderError, ProviderResult},
    session::{SessionId, SessionRegistry},
};

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Missing answers")]
    MissingInput,

    #[error("{message}")]
    Configuration { message: String, details: String },

    #[error("{message}")]
    UpstreamTransport {
        message: String,
        /// Error body reported by the provider
        details: Option<Value>,
    },

    #[error("{reason}")]
    ProtocolViolation {
        reason: ParseFailure,
        raw_text: String,
    },
}

impl From<ProviderError> for EvaluationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured { reason, hint } => Self::Configuration {
                message: reason,
                details: hint,
            },
            other => Self::UpstreamTransport {
                message: other.to_string(),
                details: other.details().cloned(),
            },
        }
    }
}

pub type EvalResult<T> = Result<T, EvaluationError>;

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub session_id: SessionId,
    pub result: EvaluationResult,
}

#[derive(Clone)]
pub struct EvaluationService {
    registry: SessionRegistry,
    provider: Arc<dyn ModelProvider>,
    config: EvaluatorConfig,
}

impl EvaluationService {
    pub fn new(
        registry: SessionRegistry,
        provider: Arc<dyn ModelProvider>,
        config: EvaluatorConfig,
    ) -> Self {
        Self {
            registry,
            provider,
            config,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.provider.ensure_configured().is_ok()
    }

    #[tracing::instrument(skip(self, profile))]
    pub async fn evaluate(
        &self,
        profile: Option<&Profile>,
        session_id: &str,
    ) -> EvalResult<Evaluation> {
        let Some(profile) = profile else {
            warn!("Missing answers in request");
            return Err(EvaluationError::MissingInput);
        };

        if let Err(err) = self.provider.ensure_configured() {
            error!(%err, "Model provider is not configured");
            return Err(err.into());
        }

        let handle = self.registry.upsert(session_id);

        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: build_messages(profile),
            max_completion_tokens: self.config.max_completion_tokens,
        };
        debug!(model = %request.model, "Sending request to model provider");

        let completion = match self.complete(&request).await {
            Ok(completion) => completion,
            Err(err) => {
                error!(%err, details = ?err.details(), "Error during evaluation");
                self.registry.mark_error(&handle, err.to_string());
                return Err(err.into());
            }
        };

        debug!(
            content = %completion.content,
            finish_reason = ?completion.metadata.finish_reason,
            "Received response from model provider"
        );
        if completion.is_truncated() {
            warn!("Completion hit the token ceiling and may be cut off");
        }

        match parse_completion(&completion.content) {
            ParseOutcome::Parsed(result) => {
                self.registry.mark_completed(&handle, result.clone());
                info!(score = result.score, "Evaluation completed");
                Ok(Evaluation {
                    session_id: handle.session_id,
                    result,
                })
            }
            ParseOutcome::Unparsable { raw_text, reason } => {
                warn!(%reason, raw_text = %raw_text, "Failed to parse model response");
                self.registry.mark_error(&handle, reason.to_string());
                Err(EvaluationError::ProtocolViolation { reason, raw_text })
            }
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion> {
        let timeout = self.config.request_timeout;
        tokio::time::timeout(timeout, self.provider.complete(request))
            .await
            .map_err(|_| ProviderError::Timeout(timeout))?
    }
}
