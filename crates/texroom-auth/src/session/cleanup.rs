//! Periodic removal of expired sessions.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::manager::SessionManager;

/// Runs [`SessionManager::cleanup_expired`] on a fixed interval.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    manager: SessionManager,
    interval: Duration,
}

impl SessionCleanup {
    /// Creates a cleanup task runner.
    pub fn new(manager: SessionManager, interval_minutes: u64) -> Self {
        Self {
            manager,
            interval: Duration::from_secs(interval_minutes.max(1) * 60),
        }
    }

    /// Runs a single cleanup cycle. Returns the number of sessions removed.
    pub async fn run_cleanup(&self) -> u64 {
        match self.manager.cleanup_expired().await {
            Ok(0) => 0,
            Ok(count) => {
                info!(count, "Removed expired sessions");
                count
            }
            Err(e) => {
                error!(error = %e, "Session cleanup failed");
                0
            }
        }
    }

    /// Spawns the cleanup loop until `shutdown` fires.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_cleanup().await;
                    }
                    _ = shutdown.recv() => {
                        info!("Session cleanup stopped");
                        break;
                    }
                }
            }
        })
    }
}
