//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use texroom_entity::room::{Room, RoomAccess};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Signup / login response. The token is also set as the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// User ID.
    pub user_id: Uuid,
    /// Username.
    pub username: String,
    /// Bearer token for non-browser clients.
    pub token: String,
    /// Session expiry.
    pub expires_at: DateTime<Utc>,
}

/// Newly created room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    /// Room ID.
    pub id: Uuid,
    /// Room name.
    pub name: String,
    /// Created at.
    pub created_at: DateTime<Utc>,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            name: room.name,
            created_at: room.created_at,
        }
    }
}

/// The caller's role in a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleResponse {
    /// Room name.
    pub room: String,
    /// `editor`, `viewer` or `none`.
    pub role: RoomAccess,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Open WebSocket connections.
    pub connections: usize,
    /// Rooms with at least one joined connection.
    pub active_rooms: usize,
    /// Conversions not yet resolved.
    pub conversions_in_flight: usize,
}
