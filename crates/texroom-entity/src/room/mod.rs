//! Room domain entities.

pub mod model;
pub mod role;

pub use model::{CreateRoom, Room, validate_room_name};
pub use role::{RoomAccess, RoomRole};
