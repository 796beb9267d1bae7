//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tracing::warn;
use uuid::Uuid;

use crate::message::types::OutboundMessage;

use super::state::ConnectionState;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// Holds the session token captured at handshake, the sender for
/// outbound events and the lifecycle state.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Raw session token from the handshake cookie or header.
    session_token: Option<String>,
    /// Sender for outbound messages.
    sender: mpsc::Sender<OutboundMessage>,
    /// Lifecycle state.
    pub state: RwLock<ConnectionState>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(session_token: Option<String>, sender: mpsc::Sender<OutboundMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_token,
            sender,
            state: RwLock::new(ConnectionState::new()),
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// The session token bound at handshake time.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Queue an outbound message without waiting.
    ///
    /// A full queue drops the message; a closed queue marks the connection dead.
    pub fn send(&self, msg: OutboundMessage) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
