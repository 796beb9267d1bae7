//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::identity::Identity;
use crate::room::RoomRole;

/// A registered participant.
///
/// The three room-reference collections mirror the membership lists held on
/// each [`Room`](crate::room::Room) record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name, also used as the display name in broadcasts.
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Rooms this user created.
    pub created_rooms: Vec<Uuid>,
    /// Rooms this user may edit.
    pub editor_rooms: Vec<Uuid>,
    /// Rooms this user may view.
    pub viewer_rooms: Vec<Uuid>,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The `(id, username)` pair carried by a resolved session.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            username: self.username.clone(),
        }
    }

    /// The room references held in `list`.
    pub fn rooms(&self, list: UserRoomList) -> &[Uuid] {
        match list {
            UserRoomList::Created => &self.created_rooms,
            UserRoomList::Editor => &self.editor_rooms,
            UserRoomList::Viewer => &self.viewer_rooms,
        }
    }
}

/// One of the three room-reference collections on a [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRoomList {
    /// `created_rooms`.
    Created,
    /// `editor_rooms`.
    Editor,
    /// `viewer_rooms`.
    Viewer,
}

impl UserRoomList {
    /// Column name backing this list.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Created => "created_rooms",
            Self::Editor => "editor_rooms",
            Self::Viewer => "viewer_rooms",
        }
    }
}

impl From<RoomRole> for UserRoomList {
    fn from(role: RoomRole) -> Self {
        match role {
            RoomRole::Editor => Self::Editor,
            RoomRole::Viewer => Self::Viewer,
        }
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
}
