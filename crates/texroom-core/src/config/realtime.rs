//! Real-time WebSocket gateway configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound queue capacity per connection. Messages beyond it are dropped.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// Largest accepted inbound frame in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer_size: default_outbound_buffer(),
            max_message_bytes: default_max_message_bytes(),
            ping_interval_seconds: default_ping_interval(),
        }
    }
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_max_message_bytes() -> usize {
    65_536
}

fn default_ping_interval() -> u64 {
    30
}
