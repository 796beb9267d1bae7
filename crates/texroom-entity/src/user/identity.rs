//! Resolved session identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The owning user.
    pub user_id: Uuid,
    /// Display name shown to other participants.
    pub username: String,
}
