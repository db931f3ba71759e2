/// Attachment metadata
///
/// The bytes live in external storage; this table only records the file name
/// and the storage reference returned by the uploader.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::ids::{AttachmentId, CardId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attachment {
    pub id: AttachmentId,
    pub card_id: CardId,
    pub file_name: String,
    pub storage_ref: String,
    pub uploaded_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAttachment {
    pub file_name: String,
    pub storage_ref: String,
}

const ATTACHMENT_COLUMNS: &str = "id, card_id, file_name, storage_ref, uploaded_by, created_at";

impl Attachment {
    pub async fn create(
        pool: &PgPool,
        card_id: CardId,
        uploaded_by: UserId,
        data: CreateAttachment,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Attachment>(&format!(
            r#"
            INSERT INTO attachments (card_id, file_name, storage_ref, uploaded_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ATTACHMENT_COLUMNS
        ))
        .bind(card_id)
        .bind(data.file_name)
        .bind(data.storage_ref)
        .bind(uploaded_by)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_card(pool: &PgPool, card_id: CardId) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Attachment>(&format!(
            "SELECT {} FROM attachments WHERE card_id = $1 ORDER BY id ASC",
            ATTACHMENT_COLUMNS
        ))
        .bind(card_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: AttachmentId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
