//! In-memory user store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use texroom_core::error::AppError;
use texroom_core::result::AppResult;
use texroom_entity::user::{CreateUser, User, UserRoomList};

use super::{push_unique, remove_all};
use crate::store::UserStore;

/// User records keyed by ID, with a unique username index.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: DashMap<Uuid, User>,
    by_username: DashMap<String, Uuid>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn list_mut(user: &mut User, list: UserRoomList) -> &mut Vec<Uuid> {
        match list {
            UserRoomList::Created => &mut user.created_rooms,
            UserRoomList::Editor => &mut user.editor_rooms,
            UserRoomList::Viewer => &mut user.viewer_rooms,
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let Some(id) = self.by_username.get(username).map(|id| *id) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| u.clone()))
            .collect())
    }

    async fn create(&self, data: CreateUser) -> AppResult<User> {
        match self.by_username.entry(data.username.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Username '{}' is already taken",
                data.username
            ))),
            Entry::Vacant(slot) => {
                let user = User {
                    id: Uuid::new_v4(),
                    username: data.username,
                    password_hash: data.password_hash,
                    created_rooms: Vec::new(),
                    editor_rooms: Vec::new(),
                    viewer_rooms: Vec::new(),
                    created_at: Utc::now(),
                };
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }

    async fn add_room_ref(
        &self,
        user_id: Uuid,
        list: UserRoomList,
        room_id: Uuid,
    ) -> AppResult<bool> {
        Ok(self
            .users
            .get_mut(&user_id)
            .map(|mut u| push_unique(Self::list_mut(&mut u, list), room_id))
            .unwrap_or(false))
    }

    async fn remove_room_ref(
        &self,
        user_id: Uuid,
        list: UserRoomList,
        room_id: Uuid,
    ) -> AppResult<bool> {
        Ok(self
            .users
            .get_mut(&user_id)
            .map(|mut u| remove_all(Self::list_mut(&mut u, list), room_id))
            .unwrap_or(false))
    }
}
