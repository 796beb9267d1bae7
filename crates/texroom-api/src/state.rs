//! Application state shared across all handlers.

use std::sync::Arc;

use texroom_auth::session::SessionManager;
use texroom_core::config::AppConfig;
use texroom_database::store::Stores;
use texroom_realtime::RealtimeEngine;
use texroom_service::conversion::Converter;
use texroom_service::room::RoomService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Signup, login and session validation
    pub session_manager: Arc<SessionManager>,
    /// Room CRUD and membership
    pub room_service: Arc<RoomService>,
    /// WebSocket realtime engine
    pub realtime: Arc<RealtimeEngine>,
}

impl AppState {
    /// Wires services over the given stores and converter.
    pub fn new(config: AppConfig, stores: &Stores, converter: Arc<dyn Converter>) -> Self {
        let session_manager = Arc::new(SessionManager::new(stores, &config.auth, &config.session));
        let room_service = Arc::new(RoomService::new(stores));
        let realtime = Arc::new(RealtimeEngine::new(
            config.realtime.clone(),
            Arc::clone(&session_manager) as Arc<dyn texroom_realtime::SessionResolver>,
            Arc::clone(&stores.rooms),
            converter,
        ));

        Self {
            config: Arc::new(config),
            session_manager,
            room_service,
            realtime,
        }
    }
}
