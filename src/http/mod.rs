//! HTTP server.
//!
//! Serves the form-encoded request/response surface consumed by the web
//! front end, with graceful shutdown on SIGINT/SIGTERM. Each request is
//! handled start to finish by one handler; nothing is shared between
//! requests except the oracle client's HTTP connection pool.

pub mod routes;

pub use routes::{AppState, router};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

/// Bind and serve until a shutdown signal arrives.
pub async fn serve(config: &Config, state: Arc<AppState>) -> AppResult<()> {
    let bind_addr = config.http_bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::internal(format!("failed to bind to {}: {}", bind_addr, e)))?;

    info!(addr = %bind_addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(wait_for_signal())
        .await
        .map_err(|e| AppError::internal(format!("HTTP server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
