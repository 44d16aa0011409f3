//! Career Evaluator HTTP API Server
//!
//! Serves the evaluation service from `career-eval-core` over HTTP:
//! `POST /evaluate`, `GET /session/{session_id}` and the liveness routes.

pub mod cors;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

use server::{ServerConfig, start_server};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Start the server with the default configuration
pub async fn start() -> anyhow::Result<()> {
    init_tracing("info");
    start_server(ServerConfig::default()).await
}

/// Start the server with a custom configuration
pub async fn start_with_config(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing("info");
    start_server(config).await
}
