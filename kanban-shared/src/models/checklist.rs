use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::ids::{CardId, ChecklistFieldId};

/// One checkable line of a card's checklist
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChecklistField {
    pub id: ChecklistFieldId,
    pub card_id: CardId,
    pub text: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateChecklistField {
    pub text: Option<String>,
    pub done: Option<bool>,
}

const FIELD_COLUMNS: &str = "id, card_id, text, done, created_at";

impl ChecklistField {
    pub async fn create(pool: &PgPool, card_id: CardId, text: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ChecklistField>(&format!(
            "INSERT INTO checklist_fields (card_id, text) VALUES ($1, $2) RETURNING {}",
            FIELD_COLUMNS
        ))
        .bind(card_id)
        .bind(text)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_card(pool: &PgPool, card_id: CardId) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChecklistField>(&format!(
            "SELECT {} FROM checklist_fields WHERE card_id = $1 ORDER BY id ASC",
            FIELD_COLUMNS
        ))
        .bind(card_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: ChecklistFieldId,
        data: UpdateChecklistField,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChecklistField>(&format!(
            r#"
            UPDATE checklist_fields
            SET text = COALESCE($2, text), done = COALESCE($3, done)
            WHERE id = $1
            RETURNING {}
            "#,
            FIELD_COLUMNS
        ))
        .bind(id)
        .bind(data.text)
        .bind(data.done)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: ChecklistFieldId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM checklist_fields WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
