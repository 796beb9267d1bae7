//! Room handlers: create, list, detail, membership and role.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use texroom_service::room::{RoomDetail, RoomSummary};

use crate::dto::request::{CreateRoomRequest, MemberRequest};
use crate::dto::response::{ApiResponse, MessageResponse, RoleResponse, RoomResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /rooms
pub async fn create_room(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateRoomRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RoomResponse>>), ApiError> {
    let room = state.room_service.create_room(&auth, &req.name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(room.into()))))
}

/// GET /myrooms
pub async fn my_rooms(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<RoomSummary>>>, ApiError> {
    let rooms = state.room_service.my_rooms(&auth).await?;
    Ok(Json(ApiResponse::ok(rooms)))
}

/// GET /viewablerooms
pub async fn viewable_rooms(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<RoomSummary>>>, ApiError> {
    let rooms = state.room_service.viewable_rooms(&auth).await?;
    Ok(Json(ApiResponse::ok(rooms)))
}

/// GET /rooms/{name}
pub async fn get_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<RoomDetail>>, ApiError> {
    let detail = state.room_service.room_detail(&auth, &name).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

/// POST /rooms/{name}/addUser
pub async fn add_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
    ValidatedJson(req): ValidatedJson<MemberRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .room_service
        .add_member(&auth, &name, &req.user_id, req.role)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
        "Added {} as {} of {}",
        req.user_id, req.role, name
    )))))
}

/// POST /rooms/{name}/removeUser
pub async fn remove_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
    ValidatedJson(req): ValidatedJson<MemberRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .room_service
        .remove_member(&auth, &name, &req.user_id, req.role)
        .await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(format!(
        "Removed {} as {} of {}",
        req.user_id, req.role, name
    )))))
}

/// GET /rooms/{name}/role
pub async fn get_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<RoleResponse>>, ApiError> {
    let role = state.room_service.role_in_room(&auth, &name).await?;
    Ok(Json(ApiResponse::ok(RoleResponse { room: name, role })))
}
