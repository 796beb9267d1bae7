//! Custom Axum extractors.

pub mod auth;
pub mod json;

pub use auth::{AuthUser, session_token};
pub use json::ValidatedJson;
