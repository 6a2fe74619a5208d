//! Graceful shutdown for the registry daemon.
//!
//! SIGINT/SIGTERM (or a programmatic [`ShutdownController::shutdown`]) is
//! fanned out over a `tokio::sync::broadcast` channel. The HTTP server takes
//! a [`ShutdownController::stopped`] future so in-flight requests drain
//! before the LMDB environment is dropped.

use std::future::Future;

use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};

pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Resolves once shutdown is triggered. Subscribes immediately, so a
    /// trigger between this call and the first poll is not lost.
    pub fn stopped(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            // Closed or lagged both mean the controller is gone or fired.
            let _ = rx.recv().await;
        }
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }

    /// Wait for SIGTERM or SIGINT, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable, only SIGINT stops the registry");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = signal::ctrl_c() => info!(signal = "SIGINT", "stopping registry"),
            _ = terminate => info!(signal = "SIGTERM", "stopping registry"),
        }
        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn stopped_sees_a_trigger_fired_before_it_is_polled() {
        let controller = ShutdownController::new();
        let stopped = controller.stopped();
        controller.shutdown();
        tokio::time::timeout(Duration::from_secs(1), stopped)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn every_subscriber_is_notified() {
        let controller = ShutdownController::new();
        let mut a = controller.subscribe();
        let mut b = controller.subscribe();
        controller.shutdown();
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }
}
