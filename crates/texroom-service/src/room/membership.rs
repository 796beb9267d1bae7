//! Editor and viewer membership changes.
//!
//! Each change updates the room record and mirrors it on the target user's
//! room references. The two writes are not transactional and concurrent
//! changes to the same room race under last-write-wins.

use tracing::info;

use texroom_auth::access;
use texroom_core::error::AppError;
use texroom_core::result::AppResult;
use texroom_entity::room::RoomRole;
use texroom_entity::user::{Identity, User};

use super::service::RoomService;

impl RoomService {
    /// Adds `target_username` to the room as `role`. Creator only.
    ///
    /// Adding an existing member again is a no-op. Adding a member of the
    /// other list fails with `Conflict`; remove them first to change role.
    pub async fn add_member(
        &self,
        caller: &Identity,
        room_name: &str,
        target_username: &str,
        role: RoomRole,
    ) -> AppResult<()> {
        let room = self.find_room(room_name).await?;
        access::require_creator(&room, caller.user_id)?;
        let target = self.find_target(target_username).await?;

        if room.has_member(role.opposite(), target.id) {
            return Err(AppError::conflict(format!(
                "'{}' is already a {} of room '{}'",
                target.username,
                role.opposite(),
                room.name
            )));
        }

        let changed = self.rooms.add_member(room.id, role, target.id).await?;
        self.users
            .add_room_ref(target.id, role.into(), room.id)
            .await?;

        info!(
            room = %room.name,
            target = %target.username,
            role = %role,
            changed,
            "Member added"
        );
        Ok(())
    }

    /// Removes `target_username` from the room's `role` list. Editors only.
    ///
    /// Removing a non-member is a no-op. The creator cannot be removed from
    /// the editor list.
    pub async fn remove_member(
        &self,
        caller: &Identity,
        room_name: &str,
        target_username: &str,
        role: RoomRole,
    ) -> AppResult<()> {
        let room = self.find_room(room_name).await?;
        access::require_editor(&room, caller.user_id)?;
        let target = self.find_target(target_username).await?;

        if role == RoomRole::Editor && access::is_creator(&room, target.id) {
            return Err(AppError::access_denied(
                "The room creator cannot be removed from the editors",
            ));
        }

        let changed = self.rooms.remove_member(room.id, role, target.id).await?;
        self.users
            .remove_room_ref(target.id, role.into(), room.id)
            .await?;

        info!(
            room = %room.name,
            target = %target.username,
            role = %role,
            changed,
            "Member removed"
        );
        Ok(())
    }

    async fn find_target(&self, username: &str) -> AppResult<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))
    }
}
