use std::{fs, path::PathBuf};

use career_eval_cli::api_client::{ApiClient, ClientError};
use clap::{Parser, Subcommand};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Career Evaluator command-line client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API server URL
    #[arg(
        long,
        short = 'u',
        default_value = "http://localhost:5002",
        env = "CAREER_EVAL_API_URL",
        global = true
    )]
    api_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit questionnaire answers for evaluation
    Evaluate {
        /// JSON file with the answers object
        #[arg()]
        answers: PathBuf,

        /// Session id to correlate with; a fresh UUID when omitted
        #[arg(short, long)]
        session_id: Option<String>,
    },

    /// Show the state of an evaluation session
    Session {
        /// Session ID
        #[arg()]
        id: String,
    },

    /// Check that the server is running
    Health,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Failed to read answers file {path}: {source}")]
    ReadAnswers {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Answers file is not valid JSON: {0}")]
    InvalidAnswers(#[from] serde_json::Error),

    #[error(transparent)]
    Client(#[from] ClientError),
}

fn output_json<T: serde::Serialize>(data: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

fn read_answers(path: &PathBuf) -> Result<Value, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::ReadAnswers {
        path: path.clone(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let client = ApiClient::new(&cli.api_url);

    match &cli.command {
        Commands::Evaluate {
            answers,
            session_id,
        } => {
            let answers = read_answers(answers)?;
            let session_id = session_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            debug!(%session_id, "Evaluating answers");

            let response = client.evaluate(answers, &session_id).await?;
            output_json(&response)
        }
        Commands::Session { id } => output_json(&client.get_session(id).await?),
        Commands::Health => output_json(&client.health_check().await?),
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
