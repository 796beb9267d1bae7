//! Session binding for real-time connections.

use async_trait::async_trait;

use texroom_auth::session::SessionManager;
use texroom_core::result::AppResult;
use texroom_entity::user::Identity;

/// Resolves the session token captured at handshake to a user identity.
#[async_trait]
pub trait SessionResolver: Send + Sync + std::fmt::Debug + 'static {
    /// Fails with `Unauthenticated` for unknown or expired sessions.
    async fn resolve(&self, token: &str) -> AppResult<Identity>;
}

#[async_trait]
impl SessionResolver for SessionManager {
    async fn resolve(&self, token: &str) -> AppResult<Identity> {
        self.validate_token(token).await
    }
}
