use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Tunables for a single evaluation round trip and for session bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EvaluatorConfig {
    /// Model identifier sent to the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// Output ceiling for the completion
    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,

    /// Upper bound for one upstream call
    #[serde(default = "default_request_timeout", with = "duration_ms")]
    #[schema(value_type = u64, pattern = "uint64 as milliseconds")]
    pub request_timeout: Duration,

    /// Sessions idle for longer than this are dropped by the sweeper
    #[serde(default = "default_session_retention", with = "duration_ms")]
    #[schema(value_type = u64, pattern = "uint64 as milliseconds")]
    pub session_retention: Duration,

    #[serde(default = "default_sweep_interval", with = "duration_ms")]
    #[schema(value_type = u64, pattern = "uint64 as milliseconds")]
    pub sweep_interval: Duration,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_completion_tokens: default_max_completion_tokens(),
            request_timeout: default_request_timeout(),
            session_retention: default_session_retention(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

/// # Provider Secret
///
/// Credentials for the model provider. The API key is optional so the process
/// can start without one; every evaluation re-checks it.
#[derive(Clone, Default)]
pub struct ProviderSecret {
    pub api_key: Option<SecretString>,
    pub organization_id: Option<String>,
    /// Overrides the provider's default API base URL
    pub api_base: Option<String>,
}

impl ProviderSecret {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            ..Default::default()
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// True when a non-blank API key is present
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

impl std::fmt::Debug for ProviderSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSecret")
            .field("api_key", &self.has_api_key().then_some("[REDACTED]"))
            .field("organization_id", &self.organization_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

pub const DEFAULT_MODEL: &str = "o4-mini";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_max_completion_tokens() -> u32 {
    1500
}
fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}
fn default_session_retention() -> Duration {
    Duration::from_secs(60 * 60)
}
fn default_sweep_interval() -> Duration {
    Duration::from_secs(10 * 60)
}
