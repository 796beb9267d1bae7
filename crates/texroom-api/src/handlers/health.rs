//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let gateway = &state.realtime.gateway;

    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connections: gateway.connection_count(),
        active_rooms: gateway.active_room_count(),
        conversions_in_flight: gateway.pipeline().in_flight_count(),
    }))
}
