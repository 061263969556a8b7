//! Graceful shutdown signal shared by the service binaries.

use tracing::{info, warn};

/// Resolves once Ctrl+C is received. Used with `axum::serve(..).with_graceful_shutdown`.
pub async fn shutdown_signal(service: &'static str) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(service, event = "shutdown_signal", "received Ctrl+C, shutting down"),
        Err(e) => warn!(service, event = "shutdown_signal_error", error = %e, "failed to listen for Ctrl+C"),
    }
}
