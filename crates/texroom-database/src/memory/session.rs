//! In-memory session store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use texroom_core::result::AppResult;
use texroom_entity::session::{CreateSession, Session};

use crate::store::SessionStore;

/// Sessions keyed by token hash.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, data: CreateSession) -> AppResult<Session> {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            token_hash: data.token_hash,
            created_at: Utc::now(),
            expires_at: data.expires_at,
        };
        self.sessions
            .insert(session.token_hash.clone(), session.clone());
        Ok(session)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        Ok(self.sessions.get(token_hash).map(|s| s.clone()))
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> AppResult<bool> {
        Ok(self.sessions.remove(token_hash).is_some())
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - self.sessions.len()) as u64)
    }
}
