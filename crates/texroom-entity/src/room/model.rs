//! Room entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use texroom_core::error::AppError;
use texroom_core::result::AppResult;

use super::role::RoomRole;

/// Longest accepted room name, in characters.
pub const ROOM_NAME_MAX: usize = 64;

/// Room names are 1 to 64 ASCII letters, digits, `-`, `_` or `.`.
pub fn validate_room_name(name: &str) -> AppResult<()> {
    if name.is_empty() || name.len() > ROOM_NAME_MAX {
        return Err(AppError::validation(format!(
            "Room name must be between 1 and {ROOM_NAME_MAX} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(AppError::validation(
            "Room name may only contain letters, digits, '-', '_' and '.'",
        ));
    }
    Ok(())
}

/// A named shared buffer with editor and viewer membership.
///
/// The editor and viewer sets are kept disjoint and the creator always
/// stays in the editor set. `content` and `markup` are overwritten
/// independently; no history is kept.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    /// Unique room identifier.
    pub id: Uuid,
    /// Unique room name, used as the join key.
    pub name: String,
    /// The user who created the room.
    pub created_by: Uuid,
    /// Users allowed to edit, in insertion order.
    pub editors: Vec<Uuid>,
    /// Users allowed to view, in insertion order.
    pub viewers: Vec<Uuid>,
    /// Last raw buffer text.
    pub content: String,
    /// Last converted markup.
    pub markup: String,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
    /// When the room was last written.
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// The membership list for `role`.
    pub fn members(&self, role: RoomRole) -> &[Uuid] {
        match role {
            RoomRole::Editor => &self.editors,
            RoomRole::Viewer => &self.viewers,
        }
    }

    /// Whether `user_id` is in the membership list for `role`.
    pub fn has_member(&self, role: RoomRole, user_id: Uuid) -> bool {
        self.members(role).contains(&user_id)
    }
}

/// Data required to create a new room.
#[derive(Debug, Clone)]
pub struct CreateRoom {
    /// Room name.
    pub name: String,
    /// Creating user, who becomes the sole initial editor.
    pub created_by: Uuid,
}
