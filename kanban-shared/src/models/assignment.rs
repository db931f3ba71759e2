/// Card assignees
///
/// Only members of the card's board can be assigned. The check and the
/// insert are a single statement, so a member removed concurrently cannot
/// slip through.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::ids::{CardId, UserId};
use crate::models::user::UserProfile;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assignment {
    pub card_id: CardId,
    pub user_id: UserId,
    pub assigned_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of [`Assignment::assign`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned,
    AlreadyAssigned,
    NotBoardMember,
}

impl Assignment {
    /// Assigns `user_id` to the card if they are a member of its board
    pub async fn assign(
        pool: &PgPool,
        card_id: CardId,
        user_id: UserId,
        assigned_by: UserId,
    ) -> Result<AssignOutcome, sqlx::Error> {
        let is_member = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM cards c
                JOIN columns col ON col.id = c.column_id
                JOIN board_members m ON m.board_id = col.board_id
                WHERE c.id = $1 AND m.user_id = $2
            )
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        if !is_member {
            return Ok(AssignOutcome::NotBoardMember);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO card_assignees (card_id, user_id, assigned_by)
            SELECT $1, $2, $3
            WHERE EXISTS(
                SELECT 1
                FROM cards c
                JOIN columns col ON col.id = c.column_id
                JOIN board_members m ON m.board_id = col.board_id
                WHERE c.id = $1 AND m.user_id = $2
            )
            ON CONFLICT (card_id, user_id) DO NOTHING
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .bind(assigned_by)
        .execute(pool)
        .await?;

        Ok(if result.rows_affected() > 0 {
            AssignOutcome::Assigned
        } else {
            AssignOutcome::AlreadyAssigned
        })
    }

    pub async fn unassign(pool: &PgPool, card_id: CardId, user_id: UserId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM card_assignees WHERE card_id = $1 AND user_id = $2")
            .bind(card_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Profiles of everyone assigned to the card
    pub async fn assignees(pool: &PgPool, card_id: CardId) -> Result<Vec<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT u.id, u.email, u.name, u.avatar_url
            FROM card_assignees a
            JOIN users u ON u.id = a.user_id
            WHERE a.card_id = $1
            ORDER BY a.created_at ASC, u.id ASC
            "#,
        )
        .bind(card_id)
        .fetch_all(pool)
        .await
    }
}
