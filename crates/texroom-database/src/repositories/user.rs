//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use texroom_core::error::{AppError, ErrorKind};
use texroom_core::result::AppResult;
use texroom_entity::user::{CreateUser, User, UserRoomList};

use crate::store::UserStore;

/// Repository for user records.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = ANY($1) ORDER BY array_position($1, id)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    async fn create(&self, data: CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn add_room_ref(
        &self,
        user_id: Uuid,
        list: UserRoomList,
        room_id: Uuid,
    ) -> AppResult<bool> {
        let column = list.column();
        let sql = format!(
            "UPDATE users SET {column} = array_append({column}, $2) \
             WHERE id = $1 AND NOT ($2 = ANY({column}))"
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to add room reference", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_room_ref(
        &self,
        user_id: Uuid,
        list: UserRoomList,
        room_id: Uuid,
    ) -> AppResult<bool> {
        let column = list.column();
        let sql = format!(
            "UPDATE users SET {column} = array_remove({column}, $2) \
             WHERE id = $1 AND $2 = ANY({column})"
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to remove room reference", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
