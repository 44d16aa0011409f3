use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use career_eval_core::{
    EvaluationService, EvaluatorConfig, ProviderSecret, SessionRegistry,
    provider::openai_chat::OpenAIChatProvider, sweeper::SessionSweeper,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    cors::{CorsPolicy, reject_disallowed_origin},
    error::handle_panic,
    middleware::log_requests,
};
use crate::routes::create_api_router;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Cross-origin policy for the browser front end
    pub cors: CorsPolicy,

    /// Model, limits and session retention
    pub evaluator: EvaluatorConfig,

    /// Model provider credentials
    pub secret: ProviderSecret,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5002,
            cors: CorsPolicy::default(),
            evaluator: EvaluatorConfig::default(),
            secret: ProviderSecret::default(),
        }
    }
}

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub service: EvaluationService,
}

impl AppState {
    pub fn new(service: EvaluationService) -> Self {
        Self { service }
    }

    /// Wire the OpenAI provider and a fresh registry from configuration.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let provider = OpenAIChatProvider::new(&config.secret, config.evaluator.request_timeout)
            .context("Failed to create the OpenAI provider")?;
        let service = EvaluationService::new(
            SessionRegistry::new(),
            Arc::new(provider),
            config.evaluator.clone(),
        );
        Ok(Self::new(service))
    }
}

/// Assemble the router with its middleware stack.
pub fn build_app(state: AppState, cors: &CorsPolicy) -> Router {
    create_api_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            log_requests,
        ))
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(
            cors.clone(),
            reject_disallowed_origin,
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors.layer())
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let registry = state.service.registry().clone();
    let api_key_status = if state.service.is_configured() {
        "Configured"
    } else {
        "Missing"
    };

    let sweeper = SessionSweeper::start(
        registry,
        config.evaluator.sweep_interval,
        config.evaluator.session_retention,
    );
    info!("Initialized session registry");

    let app = build_app(state, &config.cors);

    let addr = format!("{}:{}", config.host, config.port)
        .parse::<SocketAddr>()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        port = config.port,
        host = %config.host,
        environment = %config.cors.environment,
        model = %config.evaluator.model,
        api_key = api_key_status,
        "Career Evaluator server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.stop().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
