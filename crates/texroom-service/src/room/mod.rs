//! Room creation, listings and membership management.

pub mod membership;
pub mod service;

pub use service::{RoomDetail, RoomService, RoomSummary};
