use std::time::Duration;

use career_eval_core::{EvaluatorConfig, ProviderSecret};
use career_eval_http::{
    cors::{CorsPolicy, Environment},
    init_tracing,
    server::{ServerConfig, start_server},
};
use clap::Parser;

/// Career Evaluator HTTP API Server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5002)]
    port: u16,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Deployment environment, controls the CORS policy
    #[arg(long, env = "CAREER_EVAL_ENV", value_enum, default_value_t = Environment::Development)]
    environment: Environment,

    /// Extra allowed CORS origins
    #[arg(long = "allowed-origin", env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// OpenAI organization id
    #[arg(long, env = "OPENAI_ORG_ID")]
    openai_org_id: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_API_BASE")]
    openai_api_base: Option<String>,

    /// Chat model used for evaluations
    #[arg(long, env = "EVALUATOR_MODEL", default_value = career_eval_core::config::DEFAULT_MODEL)]
    model: String,

    /// Upstream request timeout in seconds
    #[arg(long, env = "EVALUATOR_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let mut cors = CorsPolicy {
            environment: self.environment,
            ..Default::default()
        };
        cors.allowed_origins.extend(self.allowed_origins);

        let mut secret = ProviderSecret::default();
        if let Some(api_key) = self.openai_api_key {
            secret = ProviderSecret::new(api_key);
        }
        if let Some(organization_id) = self.openai_org_id {
            secret = secret.with_organization_id(organization_id);
        }
        if let Some(api_base) = self.openai_api_base {
            secret = secret.with_api_base(api_base);
        }

        ServerConfig {
            host: self.host,
            port: self.port,
            cors,
            evaluator: EvaluatorConfig {
                model: self.model,
                request_timeout: Duration::from_secs(self.timeout_secs),
                ..Default::default()
            },
            secret,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level);
    start_server(cli.into_config()).await?;

    Ok(())
}
