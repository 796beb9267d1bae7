//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use texroom_entity::room::RoomRole;

/// Signup and login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CredentialsRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Create room request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRoomRequest {
    /// Room name.
    #[validate(length(min = 1, max = 64, message = "Room name must be 1-64 characters"))]
    pub name: String,
}

/// Add or remove a room member.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MemberRequest {
    /// Target username.
    #[serde(rename = "userId")]
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    /// Which list to change.
    pub role: RoomRole,
}
