//! Room CRUD and listings with role enforcement.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use texroom_auth::access;
use texroom_core::error::AppError;
use texroom_core::result::AppResult;
use texroom_database::store::{RoomStore, Stores, UserStore};
use texroom_entity::room::{CreateRoom, Room, RoomAccess, validate_room_name};
use texroom_entity::user::{Identity, User, UserRoomList};

/// A room as it appears in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    /// Room ID.
    pub id: Uuid,
    /// Room name.
    pub name: String,
    /// The caller's role in the room.
    pub role: RoomAccess,
    /// Whether the caller created the room.
    pub is_creator: bool,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
}

/// A room as seen by one of its members.
#[derive(Debug, Clone, Serialize)]
pub struct RoomDetail {
    /// Room ID.
    pub id: Uuid,
    /// Room name.
    pub name: String,
    /// Creator's username.
    pub creator: String,
    /// The caller's role.
    pub role: RoomAccess,
    /// Editor usernames.
    pub editors: Vec<String>,
    /// Viewer usernames. Viewers only see themselves here.
    pub viewers: Vec<String>,
    /// Last raw buffer text.
    pub content: String,
    /// Last converted markup.
    pub markup: String,
    /// When the room was created.
    pub created_at: DateTime<Utc>,
    /// When the room was last written.
    pub updated_at: DateTime<Utc>,
}

/// Room creation, lookup and membership operations.
#[derive(Debug, Clone)]
pub struct RoomService {
    pub(super) rooms: Arc<dyn RoomStore>,
    pub(super) users: Arc<dyn UserStore>,
}

impl RoomService {
    /// Creates a new room service.
    pub fn new(stores: &Stores) -> Self {
        Self {
            rooms: Arc::clone(&stores.rooms),
            users: Arc::clone(&stores.users),
        }
    }

    /// Fetches a room by name or fails with `NotFound`.
    pub async fn find_room(&self, name: &str) -> AppResult<Room> {
        self.rooms
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Room '{name}' not found")))
    }

    pub(super) async fn find_user(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated("User no longer exists"))
    }

    /// Creates a room owned by `caller`, who becomes its sole editor.
    pub async fn create_room(&self, caller: &Identity, name: &str) -> AppResult<Room> {
        validate_room_name(name)?;

        if self.rooms.find_by_name(name).await?.is_some() {
            return Err(AppError::conflict(format!("Room '{name}' already exists")));
        }

        let room = self
            .rooms
            .create(CreateRoom {
                name: name.to_string(),
                created_by: caller.user_id,
            })
            .await?;

        self.users
            .add_room_ref(caller.user_id, UserRoomList::Created, room.id)
            .await?;
        self.users
            .add_room_ref(caller.user_id, UserRoomList::Editor, room.id)
            .await?;

        info!(room = %room.name, user_id = %caller.user_id, "Room created");
        Ok(room)
    }

    /// Rooms the caller created or may edit, without duplicates.
    pub async fn my_rooms(&self, caller: &Identity) -> AppResult<Vec<RoomSummary>> {
        let user = self.find_user(caller.user_id).await?;
        let mut ids = user.created_rooms.clone();
        for id in &user.editor_rooms {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        self.summaries(caller, &ids).await
    }

    /// Rooms the caller may view.
    pub async fn viewable_rooms(&self, caller: &Identity) -> AppResult<Vec<RoomSummary>> {
        let user = self.find_user(caller.user_id).await?;
        self.summaries(caller, &user.viewer_rooms).await
    }

    /// Room detail filtered by the caller's role.
    pub async fn room_detail(&self, caller: &Identity, name: &str) -> AppResult<RoomDetail> {
        let room = self.find_room(name).await?;
        let role = access::require_member(&room, caller.user_id)?;

        let creator = self
            .users
            .find_by_id(room.created_by)
            .await?
            .map(|u| u.username)
            .unwrap_or_default();

        let editors = self.usernames(&room.editors).await?;
        let viewers = match role {
            RoomAccess::Editor => self.usernames(&room.viewers).await?,
            _ => vec![caller.username.clone()],
        };

        Ok(RoomDetail {
            id: room.id,
            name: room.name,
            creator,
            role,
            editors,
            viewers,
            content: room.content,
            markup: room.markup,
            created_at: room.created_at,
            updated_at: room.updated_at,
        })
    }

    /// The caller's role in the named room.
    pub async fn role_in_room(&self, caller: &Identity, name: &str) -> AppResult<RoomAccess> {
        let room = self.find_room(name).await?;
        Ok(access::role_of(&room, caller.user_id))
    }

    async fn summaries(&self, caller: &Identity, ids: &[Uuid]) -> AppResult<Vec<RoomSummary>> {
        let rooms = self.rooms.find_many(ids).await?;
        Ok(rooms
            .into_iter()
            .map(|room| RoomSummary {
                id: room.id,
                role: access::role_of(&room, caller.user_id),
                is_creator: access::is_creator(&room, caller.user_id),
                name: room.name,
                created_at: room.created_at,
            })
            .collect())
    }

    async fn usernames(&self, ids: &[Uuid]) -> AppResult<Vec<String>> {
        Ok(self
            .users
            .find_many(ids)
            .await?
            .into_iter()
            .map(|u| u.username)
            .collect())
    }
}
