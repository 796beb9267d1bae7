//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A login session.
///
/// Sessions are created on login and signup, and destroyed on logout or
/// once they expire. Only the SHA-256 hash of the bearer token is stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// SHA-256 hash of the opaque token.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// When the session expires (absolute timeout).
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session has passed its expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Data required to create a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// Owning user.
    pub user_id: Uuid,
    /// SHA-256 hash of the token handed to the client.
    pub token_hash: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}
