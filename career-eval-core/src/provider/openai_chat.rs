use std::time::Duration;

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::debug;

use crate::config::ProviderSecret;

use super::{
    ChatMessage, Completion, CompletionRequest, ModelProvider, ProviderError, ProviderResult,
    ResponseMetadata, Role,
};

/// Chat-completions client for OpenAI and API-compatible endpoints.
///
/// Built without a client when the secret has no API key; every call then
/// fails with [`ProviderError::NotConfigured`].
pub struct OpenAIChatProvider {
    client: Option<Client<OpenAIConfig>>,
}

impl OpenAIChatProvider {
    pub fn new(secret: &ProviderSecret, request_timeout: Duration) -> ProviderResult<Self> {
        let Some(api_key) = secret.api_key.as_ref().filter(|_| secret.has_api_key()) else {
            return Ok(Self { client: None });
        };

        let mut openai_config = OpenAIConfig::new().with_api_key(api_key.expose_secret());
        if let Some(org_id) = &secret.organization_id {
            openai_config = openai_config.with_org_id(org_id.as_str());
        }
        if let Some(api_base) = &secret.api_base {
            openai_config = openai_config.with_api_base(api_base.as_str());
        }

        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        // The library retries rate limits and server errors by default; a zero
        // elapsed-time budget leaves a single attempt.
        let backoff = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(backoff);

        Ok(Self {
            client: Some(client),
        })
    }

    fn client(&self) -> ProviderResult<&Client<OpenAIConfig>> {
        self.client.as_ref().ok_or_else(|| ProviderError::NotConfigured {
            reason: "OpenAI API key not configured".to_string(),
            hint: "Please set OPENAI_API_KEY environment variable".to_string(),
        })
    }
}

#[async_trait]
impl ModelProvider for OpenAIChatProvider {
    fn ensure_configured(&self) -> ProviderResult<()> {
        self.client().map(|_| ())
    }

    #[tracing::instrument(skip_all, fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion> {
        let client = self.client()?;

        let openai_request = CreateChatCompletionRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(to_openai_message).collect(),
            max_completion_tokens: Some(request.max_completion_tokens),
            ..Default::default()
        };

        let response = client.chat().create(openai_request).await?;
        debug!(
            id = %response.id,
            choices = response.choices.len(),
            "Received chat completion"
        );

        let choice = response.choices.first();
        let content = choice
            .and_then(|choice| choice.message.content.clone())
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(Completion {
            content,
            metadata: ResponseMetadata {
                model: response.model.clone(),
                token_usage: response
                    .usage
                    .as_ref()
                    .map(|u| (u.prompt_tokens, u.completion_tokens)),
                finish_reason: choice
                    .and_then(|c| c.finish_reason.as_ref())
                    .map(|reason| format!("{:?}", reason).to_lowercase()),
            },
        })
    }
}

fn to_openai_message(message: &ChatMessage) -> ChatCompletionRequestMessage {
    match message.role {
        Role::System => {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(message.content.clone()),
                name: None,
            })
        }
        Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(message.content.clone()),
            name: None,
        }),
    }
}

impl From<OpenAIError> for ProviderError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::ApiError(api_error) => {
                let details = json!({
                    "message": &api_error.message,
                    "type": &api_error.r#type,
                    "param": &api_error.param,
                    "code": &api_error.code,
                });
                Self::Api {
                    message: api_error.message,
                    details: Some(details),
                }
            }
            other => Self::Transport(other.to_string()),
        }
    }
}
