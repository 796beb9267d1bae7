//! Delivery of outbound events to single connections and room groups.

use std::sync::Arc;

use tracing::debug;

use crate::connection::handle::ConnectionId;
use crate::connection::pool::ConnectionPool;
use crate::message::types::OutboundMessage;

use super::registry::ChannelRegistry;

/// Routes outbound events through the connection pool.
#[derive(Debug, Clone)]
pub struct Fanout {
    pool: Arc<ConnectionPool>,
    channels: Arc<ChannelRegistry>,
}

impl Fanout {
    /// Creates a fan-out over the given pool and registry.
    pub fn new(pool: Arc<ConnectionPool>, channels: Arc<ChannelRegistry>) -> Self {
        Self { pool, channels }
    }

    /// Send to one connection. Returns `false` if it is gone or backed up.
    pub fn send_to(&self, conn_id: ConnectionId, msg: OutboundMessage) -> bool {
        match self.pool.get(&conn_id) {
            Some(handle) => handle.send(msg),
            None => false,
        }
    }

    /// Send to every member of `room` except `except`. Returns the number
    /// of connections the message was queued for.
    pub fn broadcast_except(
        &self,
        room: &str,
        except: ConnectionId,
        msg: &OutboundMessage,
    ) -> usize {
        let delivered = self
            .channels
            .members(room)
            .into_iter()
            .filter(|id| *id != except)
            .filter(|id| self.send_to(*id, msg.clone()))
            .count();
        debug!(room = %room, delivered, "Broadcast to room");
        delivered
    }
}
