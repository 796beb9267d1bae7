//! Auth handlers: signup, login, logout.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use texroom_auth::session::LoginResult;
use texroom_core::config::auth::AuthConfig;

use crate::dto::request::CredentialsRequest;
use crate::dto::response::{ApiResponse, AuthResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<AuthResponse>>), ApiError> {
    let result = state
        .session_manager
        .signup(&req.username, &req.password)
        .await?;

    let (jar, body) = logged_in(jar, &state.config.auth, result);
    Ok((StatusCode::CREATED, jar, body))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>), ApiError> {
    let result = state
        .session_manager
        .login(&req.username, &req.password)
        .await?;

    Ok(logged_in(jar, &state.config.auth, result))
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), ApiError> {
    state.session_manager.logout(&auth.token).await?;

    let config = &state.config.auth;
    let jar = jar
        .remove(Cookie::build((config.session_cookie.clone(), "")).path("/"))
        .remove(Cookie::build((config.username_cookie.clone(), "")).path("/"));

    Ok((
        jar,
        Json(ApiResponse::ok(MessageResponse::new("Logged out successfully"))),
    ))
}

fn logged_in(
    jar: CookieJar,
    config: &AuthConfig,
    result: LoginResult,
) -> (CookieJar, Json<ApiResponse<AuthResponse>>) {
    let session = Cookie::build((config.session_cookie.clone(), result.token.clone()))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax);
    // Readable by the browser UI.
    let username = Cookie::build((config.username_cookie.clone(), result.user.username.clone()))
        .path("/")
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax);

    let body = AuthResponse {
        user_id: result.user.id,
        username: result.user.username,
        token: result.token,
        expires_at: result.session.expires_at,
    };

    (jar.add(session).add(username), Json(ApiResponse::ok(body)))
}
