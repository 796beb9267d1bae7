//! In-memory record stores.
//!
//! Same semantics as the PostgreSQL repositories, held in `DashMap`s.
//! Used by the `memory` backend and as test doubles.

pub mod room;
pub mod session;
pub mod user;

pub use room::MemoryRoomStore;
pub use session::MemorySessionStore;
pub use user::MemoryUserStore;

use uuid::Uuid;

/// Append `id` unless present. Returns `true` if the list changed.
pub(crate) fn push_unique(list: &mut Vec<Uuid>, id: Uuid) -> bool {
    if list.contains(&id) {
        return false;
    }
    list.push(id);
    true
}

/// Remove every occurrence of `id`. Returns `true` if the list changed.
pub(crate) fn remove_all(list: &mut Vec<Uuid>, id: Uuid) -> bool {
    let before = list.len();
    list.retain(|existing| *existing != id);
    list.len() != before
}
