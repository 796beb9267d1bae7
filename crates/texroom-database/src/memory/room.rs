//! In-memory room store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use texroom_core::error::AppError;
use texroom_core::result::AppResult;
use texroom_entity::room::{CreateRoom, Room, RoomRole};

use super::{push_unique, remove_all};
use crate::store::RoomStore;

/// Room records keyed by ID, with a unique name index.
#[derive(Debug, Default)]
pub struct MemoryRoomStore {
    rooms: DashMap<Uuid, Room>,
    by_name: DashMap<String, Uuid>,
}

impl MemoryRoomStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn update<F, T>(&self, room_id: Uuid, apply: F) -> Option<T>
    where
        F: FnOnce(&mut Room) -> T,
    {
        self.rooms.get_mut(&room_id).map(|mut room| apply(&mut room))
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Room>> {
        Ok(self.rooms.get(&id).map(|r| r.clone()))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Room>> {
        let Some(id) = self.by_name.get(name).map(|id| *id) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Room>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.rooms.get(id).map(|r| r.clone()))
            .collect())
    }

    async fn create(&self, data: CreateRoom) -> AppResult<Room> {
        match self.by_name.entry(data.name.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Room '{}' already exists",
                data.name
            ))),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let room = Room {
                    id: Uuid::new_v4(),
                    name: data.name,
                    created_by: data.created_by,
                    editors: vec![data.created_by],
                    viewers: Vec::new(),
                    content: String::new(),
                    markup: String::new(),
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(room.id);
                self.rooms.insert(room.id, room.clone());
                Ok(room)
            }
        }
    }

    async fn add_member(&self, room_id: Uuid, role: RoomRole, user_id: Uuid) -> AppResult<bool> {
        Ok(self
            .update(room_id, |room| {
                let list = match role {
                    RoomRole::Editor => &mut room.editors,
                    RoomRole::Viewer => &mut room.viewers,
                };
                let changed = push_unique(list, user_id);
                if changed {
                    room.updated_at = Utc::now();
                }
                changed
            })
            .unwrap_or(false))
    }

    async fn remove_member(
        &self,
        room_id: Uuid,
        role: RoomRole,
        user_id: Uuid,
    ) -> AppResult<bool> {
        Ok(self
            .update(room_id, |room| {
                let list = match role {
                    RoomRole::Editor => &mut room.editors,
                    RoomRole::Viewer => &mut room.viewers,
                };
                let changed = remove_all(list, user_id);
                if changed {
                    room.updated_at = Utc::now();
                }
                changed
            })
            .unwrap_or(false))
    }

    async fn save_content(&self, room_id: Uuid, content: &str) -> AppResult<()> {
        self.update(room_id, |room| {
            room.content = content.to_string();
            room.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::not_found(format!("Room {room_id} not found")))
    }

    async fn save_markup(&self, room_id: Uuid, markup: &str) -> AppResult<()> {
        self.update(room_id, |room| {
            room.markup = markup.to_string();
            room.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::not_found(format!("Room {room_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texroom_core::error::ErrorKind;

    async fn seeded() -> (MemoryRoomStore, Room) {
        let store = MemoryRoomStore::new();
        let room = store
            .create(CreateRoom {
                name: "r1".into(),
                created_by: Uuid::new_v4(),
            })
            .await
            .unwrap();
        (store, room)
    }

    #[tokio::test]
    async fn test_creator_is_sole_editor() {
        let (_, room) = seeded().await;
        assert_eq!(room.editors, vec![room.created_by]);
        assert!(room.viewers.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let (store, room) = seeded().await;
        let err = store
            .create(CreateRoom {
                name: "r1".into(),
                created_by: room.created_by,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_add_then_remove_restores_record() {
        let (store, room) = seeded().await;
        let viewer = Uuid::new_v4();

        assert!(store.add_member(room.id, RoomRole::Viewer, viewer).await.unwrap());
        assert!(!store.add_member(room.id, RoomRole::Viewer, viewer).await.unwrap());
        assert!(store.remove_member(room.id, RoomRole::Viewer, viewer).await.unwrap());

        let after = store.find_by_name("r1").await.unwrap().unwrap();
        assert_eq!(after.editors, room.editors);
        assert_eq!(after.viewers, room.viewers);
    }

    #[tokio::test]
    async fn test_save_to_unknown_room_is_not_found() {
        let (store, _) = seeded().await;
        let err = store.save_content(Uuid::new_v4(), "x").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_content_and_markup_written_independently() {
        let (store, room) = seeded().await;
        store.save_content(room.id, "x^2").await.unwrap();
        store.save_markup(room.id, "x^{2}").await.unwrap();
        store.save_content(room.id, "y").await.unwrap();

        let after = store.find_by_id(room.id).await.unwrap().unwrap();
        assert_eq!(after.content, "y");
        assert_eq!(after.markup, "x^{2}");
    }
}
