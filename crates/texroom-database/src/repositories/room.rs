//! Room repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use texroom_core::error::{AppError, ErrorKind};
use texroom_core::result::AppResult;
use texroom_entity::room::{CreateRoom, Room, RoomRole};

use crate::store::RoomStore;

/// Repository for room records.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    /// Create a new room repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn overwrite(&self, room_id: Uuid, column: &str, value: &str) -> AppResult<()> {
        let sql = format!("UPDATE rooms SET {column} = $2, updated_at = NOW() WHERE id = $1");
        let result = sqlx::query(&sql)
            .bind(room_id)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, format!("Failed to save room {column}"), e)
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Room {room_id} not found")));
        }
        Ok(())
    }
}

fn member_column(role: RoomRole) -> &'static str {
    match role {
        RoomRole::Editor => "editors",
        RoomRole::Viewer => "viewers",
    }
}

#[async_trait]
impl RoomStore for RoomRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Room>> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find room", e))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Room>> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find room by name", e)
            })
    }

    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Room>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Room>(
            "SELECT * FROM rooms WHERE id = ANY($1) ORDER BY array_position($1, id)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list rooms", e))
    }

    async fn create(&self, data: CreateRoom) -> AppResult<Room> {
        let now = Utc::now();
        sqlx::query_as::<_, Room>(
            "INSERT INTO rooms (id, name, created_by, editors, created_at, updated_at) \
             VALUES ($1, $2, $3, ARRAY[$3]::uuid[], $4, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(data.created_by)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn add_member(&self, room_id: Uuid, role: RoomRole, user_id: Uuid) -> AppResult<bool> {
        let column = member_column(role);
        let sql = format!(
            "UPDATE rooms SET {column} = array_append({column}, $2), updated_at = NOW() \
             WHERE id = $1 AND NOT ($2 = ANY({column}))"
        );
        let result = sqlx::query(&sql)
            .bind(room_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add member", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_member(
        &self,
        room_id: Uuid,
        role: RoomRole,
        user_id: Uuid,
    ) -> AppResult<bool> {
        let column = member_column(role);
        let sql = format!(
            "UPDATE rooms SET {column} = array_remove({column}, $2), updated_at = NOW() \
             WHERE id = $1 AND $2 = ANY({column})"
        );
        let result = sqlx::query(&sql)
            .bind(room_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to remove member", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn save_content(&self, room_id: Uuid, content: &str) -> AppResult<()> {
        self.overwrite(room_id, "content", content).await
    }

    async fn save_markup(&self, room_id: Uuid, markup: &str) -> AppResult<()> {
        self.overwrite(room_id, "markup", markup).await
    }
}
