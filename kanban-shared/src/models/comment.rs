/// Card comments
///
/// Editing and deleting a comment is restricted to its author in the API
/// layer on top of the usual `MutateContent` check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::ids::{CardId, CommentId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub card_id: CardId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COMMENT_COLUMNS: &str = "id, card_id, author_id, text, created_at, updated_at";

impl Comment {
    pub async fn create(
        pool: &PgPool,
        card_id: CardId,
        author_id: UserId,
        text: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (card_id, author_id, text) VALUES ($1, $2, $3) RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(card_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: CommentId) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Comments of a card, oldest first
    pub async fn list_by_card(pool: &PgPool, card_id: CardId) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments WHERE card_id = $1 ORDER BY created_at ASC, id ASC",
            COMMENT_COLUMNS
        ))
        .bind(card_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update_text(
        pool: &PgPool,
        id: CommentId,
        text: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET text = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .bind(text)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: CommentId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
