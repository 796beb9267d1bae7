//! Record store traits.
//!
//! Membership updates are single idempotent operations: adding a member
//! that is already present, or removing one that is absent, reports
//! `false` and leaves the record untouched.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use texroom_core::result::AppResult;
use texroom_entity::room::{CreateRoom, Room, RoomRole};
use texroom_entity::session::{CreateSession, Session};
use texroom_entity::user::{CreateUser, User, UserRoomList};

use crate::memory::{MemoryRoomStore, MemorySessionStore, MemoryUserStore};
use crate::repositories::{RoomRepository, SessionRepository, UserRepository};

/// Persistent user records.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by username (exact match).
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Fetch users by ID, preserving the order of `ids` and skipping unknown IDs.
    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<User>>;

    /// Insert a new user. Fails with `Conflict` if the username is taken.
    async fn create(&self, data: CreateUser) -> AppResult<User>;

    /// Append `room_id` to one of the user's room lists.
    async fn add_room_ref(&self, user_id: Uuid, list: UserRoomList, room_id: Uuid)
    -> AppResult<bool>;

    /// Remove `room_id` from one of the user's room lists.
    async fn remove_room_ref(
        &self,
        user_id: Uuid,
        list: UserRoomList,
        room_id: Uuid,
    ) -> AppResult<bool>;
}

/// Persistent room records.
#[async_trait]
pub trait RoomStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a room by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Room>>;

    /// Find a room by its unique name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Room>>;

    /// Fetch rooms by ID, preserving the order of `ids` and skipping unknown IDs.
    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Room>>;

    /// Insert a new room with the creator as sole editor. Fails with
    /// `Conflict` if the name is taken.
    async fn create(&self, data: CreateRoom) -> AppResult<Room>;

    /// Append `user_id` to the membership list for `role`.
    async fn add_member(&self, room_id: Uuid, role: RoomRole, user_id: Uuid) -> AppResult<bool>;

    /// Remove `user_id` from the membership list for `role`.
    async fn remove_member(&self, room_id: Uuid, role: RoomRole, user_id: Uuid)
    -> AppResult<bool>;

    /// Overwrite the raw buffer text.
    async fn save_content(&self, room_id: Uuid, content: &str) -> AppResult<()>;

    /// Overwrite the converted markup.
    async fn save_markup(&self, room_id: Uuid, markup: &str) -> AppResult<()>;
}

/// Persistent login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new session.
    async fn create(&self, data: CreateSession) -> AppResult<Session>;

    /// Find a session by token hash, expired or not.
    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>>;

    /// Delete a session by token hash. Returns `true` if one existed.
    async fn delete_by_token_hash(&self, token_hash: &str) -> AppResult<bool>;

    /// Delete every session past its expiry. Returns the number removed.
    async fn delete_expired(&self) -> AppResult<u64>;
}

/// The three record stores, behind trait objects.
#[derive(Debug, Clone)]
pub struct Stores {
    /// User records.
    pub users: Arc<dyn UserStore>,
    /// Room records.
    pub rooms: Arc<dyn RoomStore>,
    /// Login sessions.
    pub sessions: Arc<dyn SessionStore>,
}

impl Stores {
    /// Stores backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            rooms: Arc::new(RoomRepository::new(pool.clone())),
            sessions: Arc::new(SessionRepository::new(pool)),
        }
    }

    /// Process-local stores.
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            rooms: Arc::new(MemoryRoomStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
        }
    }
}
