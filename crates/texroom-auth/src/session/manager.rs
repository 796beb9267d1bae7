//! Session lifecycle manager: signup, login, logout and token validation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use texroom_core::config::auth::AuthConfig;
use texroom_core::config::session::SessionConfig;
use texroom_core::error::AppError;
use texroom_core::result::AppResult;
use texroom_database::store::{SessionStore, Stores, UserStore};
use texroom_entity::session::{CreateSession, Session};
use texroom_entity::user::{CreateUser, Identity, User};

use crate::password::{PasswordHasher, PasswordValidator};

use super::token::{generate_token, hash_token};

/// Result of a successful signup or login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Raw bearer token. Returned once, never stored.
    pub token: String,
    /// The created session.
    pub session: Session,
    /// The authenticated user.
    pub user: User,
}

/// Manages the complete session lifecycle.
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: PasswordHasher,
    validator: PasswordValidator,
    ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager over the given stores.
    pub fn new(stores: &Stores, auth_config: &AuthConfig, session_config: &SessionConfig) -> Self {
        Self {
            users: Arc::clone(&stores.users),
            sessions: Arc::clone(&stores.sessions),
            hasher: PasswordHasher::new(),
            validator: PasswordValidator::new(auth_config),
            ttl: Duration::hours(session_config.ttl_hours as i64),
        }
    }

    /// Registers a new account and logs it in.
    pub async fn signup(&self, username: &str, password: &str) -> AppResult<LoginResult> {
        self.validator.validate_username(username)?;
        self.validator.validate(password)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Username '{username}' is already taken"
            )));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self
            .users
            .create(CreateUser {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User signed up");
        self.open_session(user).await
    }

    /// Verifies credentials and opens a new session.
    ///
    /// Unknown usernames and wrong passwords fail with the same message.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResult> {
        let Some(user) = self.users.find_by_username(username).await? else {
            debug!(username = %username, "Login for unknown user");
            return Err(AppError::unauthenticated("Invalid username or password"));
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::unauthenticated("Invalid username or password"));
        }

        let result = self.open_session(user).await?;
        info!(
            user_id = %result.user.id,
            session_id = %result.session.id,
            "Login successful"
        );
        Ok(result)
    }

    /// Destroys the session behind `token`. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        if self.sessions.delete_by_token_hash(&hash_token(token)).await? {
            info!("Session logged out");
        }
        Ok(())
    }

    /// Resolves a raw token to the identity that owns it.
    ///
    /// Expired sessions are deleted when encountered.
    pub async fn validate_token(&self, token: &str) -> AppResult<Identity> {
        let token_hash = hash_token(token);
        let Some(session) = self.sessions.find_by_token_hash(&token_hash).await? else {
            return Err(AppError::unauthenticated("Session not found"));
        };

        if session.is_expired() {
            self.sessions.delete_by_token_hash(&token_hash).await?;
            debug!(session_id = %session.id, "Rejected expired session");
            return Err(AppError::unauthenticated("Session expired"));
        }

        let user = self
            .users
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| AppError::unauthenticated("Session owner no longer exists"))?;

        Ok(user.identity())
    }

    /// Deletes every expired session. Returns the number removed.
    pub async fn cleanup_expired(&self) -> AppResult<u64> {
        self.sessions.delete_expired().await
    }

    async fn open_session(&self, user: User) -> AppResult<LoginResult> {
        let token = generate_token();
        let session = self
            .sessions
            .create(CreateSession {
                user_id: user.id,
                token_hash: hash_token(&token),
                expires_at: Utc::now() + self.ttl,
            })
            .await?;

        Ok(LoginResult {
            token,
            session,
            user,
        })
    }
}
