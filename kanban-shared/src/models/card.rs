/// Card model
///
/// Like columns, cards are only read and edited here; placement
/// (`column_id`, `order_index`) is owned by [`crate::ordering`].
///
/// The `has_*` flags are derived on every read from the leaf tables rather
/// than stored, so they can never drift from the actual content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::ids::{BoardId, CardId, ColumnId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    pub id: CardId,
    pub column_id: ColumnId,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub deadline: Option<DateTime<Utc>>,
    pub done: bool,

    /// Reference to the cover image in external storage
    pub cover: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub has_checklist: bool,
    pub has_attachments: bool,
    pub has_assignees: bool,
    pub has_comments: bool,
}

/// Input for creating a card; it is always appended to its column
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCard {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub deadline: Option<DateTime<Utc>>,
}

/// Editable card fields; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCard {
    pub title: Option<String>,
    pub description: Option<String>,

    /// `Some(None)` clears the deadline
    #[serde(default, deserialize_with = "super::present")]
    pub deadline: Option<Option<DateTime<Utc>>>,

    pub done: Option<bool>,

    /// `Some(None)` removes the cover
    #[serde(default, deserialize_with = "super::present")]
    pub cover: Option<Option<String>>,
}

pub(crate) const CARD_SELECT: &str = r#"
    SELECT c.id, c.column_id, c.title, c.description, c.order_index, c.deadline,
           c.done, c.cover, c.created_at, c.updated_at,
           EXISTS(SELECT 1 FROM checklist_fields f WHERE f.card_id = c.id) AS has_checklist,
           EXISTS(SELECT 1 FROM attachments a WHERE a.card_id = c.id) AS has_attachments,
           EXISTS(SELECT 1 FROM card_assignees s WHERE s.card_id = c.id) AS has_assignees,
           EXISTS(SELECT 1 FROM comments m WHERE m.card_id = c.id) AS has_comments
    FROM cards c
"#;

impl Card {
    pub async fn find_by_id(pool: &PgPool, id: CardId) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Card>(&format!("{} WHERE c.id = $1", CARD_SELECT))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Cards of one column in display order
    pub async fn list_by_column(pool: &PgPool, column_id: ColumnId) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Card>(&format!(
            "{} WHERE c.column_id = $1 ORDER BY c.order_index ASC",
            CARD_SELECT
        ))
        .bind(column_id)
        .fetch_all(pool)
        .await
    }

    /// Every card on a board, grouped by column order then card order
    pub async fn list_by_board(pool: &PgPool, board_id: BoardId) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Card>(&format!(
            r#"{}
            JOIN columns col ON col.id = c.column_id
            WHERE col.board_id = $1
            ORDER BY col.order_index ASC, c.order_index ASC
            "#,
            CARD_SELECT
        ))
        .bind(board_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: CardId,
        data: UpdateCard,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (deadline_set, deadline) = split_patch(data.deadline);
        let (cover_set, cover) = split_patch(data.cover);

        let updated = sqlx::query(
            r#"
            UPDATE cards
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                deadline = CASE WHEN $4 THEN $5 ELSE deadline END,
                done = COALESCE($6, done),
                cover = CASE WHEN $7 THEN $8 ELSE cover END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(deadline_set)
        .bind(deadline)
        .bind(data.done)
        .bind(cover_set)
        .bind(cover)
        .execute(pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }
}

/// Splits a nullable patch field into "was it sent" and "new value"
fn split_patch<T>(patch: Option<Option<T>>) -> (bool, Option<T>) {
    match patch {
        Some(value) => (true, value),
        None => (false, None),
    }
}
