//! Graceful shutdown handling for Steward server

use actix_web::dev::ServerHandle;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Shutdown signal sender and receiver
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    pub fn shutdown(&self) {
        let _ = self.sender.send(());
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut signal) => {
            signal.recv().await;
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
///
/// Returns the shutdown signal that is triggered when one arrives.
pub fn wait_for_shutdown_signal() -> ShutdownSignal {
    let shutdown = ShutdownSignal::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = ctrl_c() => {
                info!("Received Ctrl+C, initiating graceful shutdown...");
            }
            _ = terminate() => {
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
        }
        shutdown_clone.shutdown();
    });

    shutdown
}

/// Stop the HTTP server gracefully once `receiver` fires
///
/// In-flight requests get the server's shutdown timeout to finish.
pub async fn stop_on_signal(mut receiver: broadcast::Receiver<()>, handle: ServerHandle) {
    let _ = receiver.recv().await;
    info!("Shutdown initiated, draining in-flight requests...");
    handle.stop(true).await;
    info!("Shutdown complete");
}
