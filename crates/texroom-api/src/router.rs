//! Route definitions for the TexRoom HTTP API.
//!
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with every route.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(room_routes())
        .route("/health", get(handlers::health::health))
        .route("/ws", get(handlers::ws::ws_upgrade))
        .with_state(state)
}

/// Account endpoints: signup, login, logout
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
}

/// Room CRUD, listings and membership
fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(handlers::room::create_room))
        .route("/myrooms", get(handlers::room::my_rooms))
        .route("/viewablerooms", get(handlers::room::viewable_rooms))
        .route("/rooms/{name}", get(handlers::room::get_room))
        .route("/rooms/{name}/addUser", post(handlers::room::add_user))
        .route("/rooms/{name}/removeUser", post(handlers::room::remove_user))
        .route("/rooms/{name}/role", get(handlers::room::get_role))
}
