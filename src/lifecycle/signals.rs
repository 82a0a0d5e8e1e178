//! OS signal handling.
//!
//! Ctrl+C (SIGINT) asks the host to shut the kernel down. Uses Tokio's
//! async-safe signal handling.

/// Wait for Ctrl+C. If the handler cannot be installed, wait forever so the
/// caller's other branches decide when to stop.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
