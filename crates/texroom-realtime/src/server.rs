//! Top-level real-time engine that owns the gateway and shutdown signal.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use texroom_core::config::realtime::RealtimeConfig;
use texroom_core::error::AppError;
use texroom_database::store::RoomStore;
use texroom_service::conversion::Converter;

use crate::connection::authenticator::SessionResolver;
use crate::gateway::RoomGateway;

/// Central real-time engine shared by the HTTP layer.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Room gateway.
    pub gateway: Arc<RoomGateway>,
    /// Realtime settings, read by the transport loop.
    pub config: RealtimeConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.gateway.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine.
    pub fn new(
        config: RealtimeConfig,
        sessions: Arc<dyn SessionResolver>,
        rooms: Arc<dyn RoomStore>,
        converter: Arc<dyn Converter>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let gateway = Arc::new(RoomGateway::new(config.clone(), sessions, rooms, converter));

        info!("Real-time engine initialized");

        Self {
            gateway,
            config,
            shutdown_tx,
        }
    }

    /// Returns a shutdown receiver. Connection loops select on it.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals every connection loop to stop, aborts pending conversions
    /// and drops all connections.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down real-time engine");

        let _ = self.shutdown_tx.send(());
        let aborted = self.gateway.pipeline().abort_all();
        self.gateway.disconnect_all().await;

        info!(aborted, "Real-time engine shut down");
        Ok(())
    }
}
