use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Manages process shutdown on SIGINT/SIGTERM
///
/// Every long-running task watches a clone of [`GracefulShutdown::token`];
/// cancelling it stops the accept loop and closes live connections.
#[derive(Debug, Clone)]
pub struct GracefulShutdown {
    token: CancellationToken,
}

impl GracefulShutdown {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_shutdown_initiated(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Manually trigger shutdown
    pub fn trigger_shutdown(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("shutdown triggered");
            self.token.cancel();
        }
    }

    /// Wait for SIGINT or SIGTERM, then trigger shutdown
    pub async fn run_signal_handler(&self) {
        tracing::info!("signal handler started, listening for SIGINT and SIGTERM");

        tokio::select! {
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => tracing::info!("received SIGINT, shutting down"),
                    Err(e) => {
                        tracing::error!(error = %e, "cannot listen for SIGINT");
                        return;
                    }
                }
            }
            _ = wait_for_sigterm() => {
                tracing::info!("received SIGTERM, shutting down");
            }
            _ = self.token.cancelled() => return,
        }

        self.trigger_shutdown();
    }
}

impl Default for GracefulShutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::error!(error = %e, "cannot listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_graceful_shutdown_creation() {
        let shutdown = GracefulShutdown::new();
        assert!(!shutdown.is_shutdown_initiated());
    }

    #[tokio::test]
    async fn test_manual_trigger_reaches_tokens() {
        let shutdown = GracefulShutdown::new();
        let token = shutdown.token();

        shutdown.trigger_shutdown();
        assert!(shutdown.is_shutdown_initiated());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_signal_handler_returns_after_manual_trigger() {
        let shutdown = GracefulShutdown::new();
        let handler = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move { shutdown.run_signal_handler().await })
        };

        shutdown.trigger_shutdown();
        tokio::time::timeout(Duration::from_secs(1), handler)
            .await
            .unwrap()
            .unwrap();
    }
}
