//! `AuthUser` extractor: pulls the session token from the cookie or the
//! `Authorization` header and resolves it to an identity.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use texroom_core::error::AppError;
use texroom_entity::user::Identity;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Who is calling.
    pub identity: Identity,
    /// The raw session token, needed for logout.
    pub token: String,
}

impl std::ops::Deref for AuthUser {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.identity
    }
}

/// Reads the session token from the named cookie, falling back to a
/// `Bearer` authorization header.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(cookie_name).filter(|c| !c.value().is_empty()) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.config.auth.session_cookie)
            .ok_or_else(|| AppError::unauthenticated("Not logged in"))?;

        let identity = state.session_manager.validate_token(&token).await?;

        Ok(AuthUser { identity, token })
    }
}
