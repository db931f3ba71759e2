/// Column model
///
/// Only reads and title edits live here. Anything that touches
/// `order_index` (create, delete, move) goes through [`crate::ordering`] so
/// the per-board index set stays `{0, …, n-1}`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE columns (
///     id BIGSERIAL PRIMARY KEY,
///     board_id BIGINT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     order_index INTEGER NOT NULL CHECK (order_index >= 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT columns_board_order_unique
///         UNIQUE (board_id, order_index) DEFERRABLE INITIALLY DEFERRED
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::ids::{BoardId, ColumnId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub title: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

pub(crate) const COLUMN_COLUMNS: &str = "id, board_id, title, order_index, created_at";

impl Column {
    pub async fn find_by_id(pool: &PgPool, id: ColumnId) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(&format!("SELECT {} FROM columns WHERE id = $1", COLUMN_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Columns of a board in display order
    pub async fn list_by_board(pool: &PgPool, board_id: BoardId) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(&format!(
            "SELECT {} FROM columns WHERE board_id = $1 ORDER BY order_index ASC",
            COLUMN_COLUMNS
        ))
        .bind(board_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update_title(
        pool: &PgPool,
        id: ColumnId,
        title: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Column>(&format!(
            "UPDATE columns SET title = $2 WHERE id = $1 RETURNING {}",
            COLUMN_COLUMNS
        ))
        .bind(id)
        .bind(title)
        .fetch_optional(pool)
        .await
    }
}
