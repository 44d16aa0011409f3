use career_eval_http::{
    extract::SESSION_ID_HEADER,
    models::{ErrorResponse, EvaluateRequest, EvaluateResponse, HealthResponse, SessionResponse},
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer; `error` and `details` come from the server's body.
    #[error("API error ({status}): {error}{}", detail_suffix(.details))]
    Api {
        status: u16,
        error: String,
        details: Option<String>,
        body: Option<ErrorResponse>,
    },
}

fn detail_suffix(details: &Option<String>) -> String {
    details
        .as_deref()
        .map(|details| format!(" - {details}"))
        .unwrap_or_default()
}

pub type ClientResult<T> = Result<T, ClientError>;

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `POST /evaluate`, correlated through the `X-Session-ID` header.
    pub async fn evaluate(&self, answers: Value, session_id: &str) -> ClientResult<EvaluateResponse> {
        let url = format!("{}/evaluate", self.base_url);
        let body = EvaluateRequest {
            answers: Some(answers),
            session_id: Some(session_id.to_string()),
        };
        debug!(%url, %session_id, "Submitting answers");

        let response = self
            .client
            .post(&url)
            .header(SESSION_ID_HEADER, session_id)
            .json(&body)
            .send()
            .await?;
        parse_response(response).await
    }

    pub async fn get_session(&self, session_id: &str) -> ClientResult<SessionResponse> {
        let url = format!("{}/session/{}", self.base_url, session_id);
        let response = self.client.get(&url).send().await?;
        parse_response(response).await
    }

    pub async fn health_check(&self) -> ClientResult<HealthResponse> {
        let url = format!("{}/", self.base_url);
        let response = self.client.get(&url).send().await?;
        parse_response(response).await
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorResponse>(&text).ok();
    let (error, details) = match &body {
        Some(body) => (body.error.clone(), body.details.clone()),
        None => (
            status.canonical_reason().unwrap_or("Unknown error").to_string(),
            Some(text).filter(|text| !text.is_empty()),
        ),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        error,
        details,
        body,
    })
}
