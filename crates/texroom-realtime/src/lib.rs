//! # texroom-realtime
//!
//! Real-time room gateway for TexRoom. Provides:
//!
//! - Connection lifecycle tracking bound to login sessions
//! - Room broadcast groups keyed by room name
//! - Per-event editor/viewer enforcement against the room store
//! - Asynchronous text-to-markup conversion with result fan-out

pub mod channel;
pub mod connection;
pub mod gateway;
pub mod message;
pub mod pipeline;
pub mod server;

pub use connection::authenticator::SessionResolver;
pub use gateway::RoomGateway;
pub use message::types::{InboundMessage, OutboundMessage};
pub use server::RealtimeEngine;
