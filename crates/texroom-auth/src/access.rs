//! Room role resolution.
//!
//! Pure functions over an already-fetched [`Room`]. Editor membership wins
//! over viewer membership. Nothing here performs I/O or caches results.

use uuid::Uuid;

use texroom_core::error::AppError;
use texroom_core::result::AppResult;
use texroom_entity::room::{Room, RoomAccess};

/// The access `user_id` has to `room`.
pub fn role_of(room: &Room, user_id: Uuid) -> RoomAccess {
    if room.editors.contains(&user_id) {
        RoomAccess::Editor
    } else if room.viewers.contains(&user_id) {
        RoomAccess::Viewer
    } else {
        RoomAccess::None
    }
}

/// Whether `user_id` created `room`.
pub fn is_creator(room: &Room, user_id: Uuid) -> bool {
    room.created_by == user_id
}

/// Fails with `AccessDenied` unless `user_id` is an editor or viewer.
pub fn require_member(room: &Room, user_id: Uuid) -> AppResult<RoomAccess> {
    match role_of(room, user_id) {
        RoomAccess::None => Err(AppError::access_denied(format!(
            "You are not a member of room '{}'",
            room.name
        ))),
        access => Ok(access),
    }
}

/// Fails with `AccessDenied` unless `user_id` is an editor.
pub fn require_editor(room: &Room, user_id: Uuid) -> AppResult<()> {
    if role_of(room, user_id) == RoomAccess::Editor {
        Ok(())
    } else {
        Err(AppError::access_denied(format!(
            "Only editors may modify room '{}'",
            room.name
        )))
    }
}

/// Fails with `AccessDenied` unless `user_id` created the room.
pub fn require_creator(room: &Room, user_id: Uuid) -> AppResult<()> {
    if is_creator(room, user_id) {
        Ok(())
    } else {
        Err(AppError::access_denied(format!(
            "Only the creator of room '{}' may manage its members",
            room.name
        )))
    }
}
