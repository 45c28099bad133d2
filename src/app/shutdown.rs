//! Graceful shutdown handling.

use tokio_util::sync::CancellationToken;

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("Shutdown signal received");
}

/// Stops all background tasks.
///
/// Cancels the shared token (server, summary logger and keep-alive all watch
/// it) and waits for each task to finish.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    tasks: Vec<tokio::task::JoinHandle<()>>,
) {
    cancel.cancel();
    for task in tasks {
        if let Err(e) = task.await {
            log::warn!("Background task ended abnormally: {}", e);
        }
    }
}
