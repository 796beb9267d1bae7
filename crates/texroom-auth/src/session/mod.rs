//! Session lifecycle management.

pub mod cleanup;
pub mod manager;
pub mod token;

pub use cleanup::SessionCleanup;
pub use manager::{LoginResult, SessionManager};
