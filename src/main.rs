//! NL2SQL Server - Main entry point.
//!
//! Serves the NL→SQL query surface and the SQL dump ingestion pipeline over
//! HTTP. Database credentials arrive per request; the only startup
//! configuration is the bind address and the language-model settings.

use clap::Parser;
use nl2sql_server::config::Config;
use nl2sql_server::http::{self, AppState};
use nl2sql_server::llm::LlmClient;
use nl2sql_server::service::{IngestService, QueryService};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    init_tracing(&config);

    if config.openai_api_key.trim().is_empty() {
        eprintln!("Error: a language-model API key is required.");
        eprintln!();
        eprintln!("Usage: nl2sql-server --openai-api-key <KEY>");
        eprintln!("       OPENAI_API_KEY=<KEY> nl2sql-server");
        std::process::exit(1);
    }

    info!(
        model = %config.model,
        "Starting NL2SQL Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let oracle = LlmClient::from_config(&config)?;
    let state = Arc::new(AppState {
        query: QueryService::new(oracle.clone()),
        ingest: IngestService::new(oracle),
    });

    if let Err(e) = http::serve(&config, state).await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
