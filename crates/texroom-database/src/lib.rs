//! # texroom-database
//!
//! Record store traits for users, rooms and sessions, with a PostgreSQL
//! implementation (sqlx repositories) and an in-memory implementation
//! sharing the same semantics.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{RoomStore, SessionStore, Stores, UserStore};
