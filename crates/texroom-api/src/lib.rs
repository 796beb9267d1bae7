//! # texroom-api
//!
//! HTTP API layer for TexRoom built on Axum.
//!
//! Provides the account and room endpoints, the WebSocket upgrade into the
//! room gateway, cookie handling, extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
