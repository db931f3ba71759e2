/// Board model and database operations
///
/// A board has no owner column: ownership is collective through its
/// memberships. Creating a board makes the creator its first `admin` in the
/// same transaction.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(255) NOT NULL,
///     background VARCHAR(512),
///     invite_token UUID UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::membership::{CreateMembership, Membership};
use crate::access::role::Role;
use crate::ids::{BoardId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub id: BoardId,
    pub name: String,

    /// Reference to the background image in external storage
    pub background: Option<String>,

    /// Token of the active invite link, if one was issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_token: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Board as listed for one user, with that user's role and last visit
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardSummary {
    pub id: BoardId,
    pub name: String,
    pub background: Option<String>,
    pub role: Role,
    pub visited_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoard {
    pub name: String,
    pub background: Option<String>,
}

/// Board patch; `Some(None)` clears the background
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBoard {
    pub name: Option<String>,

    #[serde(default, deserialize_with = "super::present")]
    pub background: Option<Option<String>>,
}

const BOARD_COLUMNS: &str = "id, name, background, invite_token, created_at, updated_at";

impl Board {
    /// Creates a board and makes `creator` its admin
    pub async fn create(
        pool: &PgPool,
        creator: UserId,
        data: CreateBoard,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(&format!(
            "INSERT INTO boards (name, background) VALUES ($1, $2) RETURNING {}",
            BOARD_COLUMNS
        ))
        .bind(data.name)
        .bind(data.background)
        .fetch_one(&mut *tx)
        .await?;

        Membership::create(
            &mut *tx,
            CreateMembership {
                board_id: board.id,
                user_id: creator,
                role: Role::Admin,
                added_by: None,
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(board_id = %board.id, creator = %creator, "Board created");
        Ok(board)
    }

    pub async fn find_by_id(pool: &PgPool, id: BoardId) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(&format!("SELECT {} FROM boards WHERE id = $1", BOARD_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_invite_token(
        pool: &PgPool,
        token: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(&format!(
            "SELECT {} FROM boards WHERE invite_token = $1",
            BOARD_COLUMNS
        ))
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    /// Lists the boards `user_id` is a member of, most recently visited first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Vec<BoardSummary>, sqlx::Error> {
        sqlx::query_as::<_, BoardSummary>(
            r#"
            SELECT b.id, b.name, b.background, m.role, m.visited_at, b.updated_at
            FROM boards b
            JOIN board_members m ON m.board_id = b.id
            WHERE m.user_id = $1
            ORDER BY m.visited_at DESC NULLS LAST, b.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: BoardId,
        data: UpdateBoard,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (background_set, background) = match data.background {
            Some(value) => (true, value),
            None => (false, None),
        };

        sqlx::query_as::<_, Board>(&format!(
            r#"
            UPDATE boards
            SET name = COALESCE($2, name),
                background = CASE WHEN $3 THEN $4 ELSE background END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOARD_COLUMNS
        ))
        .bind(id)
        .bind(data.name)
        .bind(background_set)
        .bind(background)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a board with its memberships, columns and cards
    pub async fn delete(pool: &PgPool, id: BoardId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Issues a fresh invite token, invalidating any previous link
    pub async fn rotate_invite_token(pool: &PgPool, id: BoardId) -> Result<Option<Uuid>, sqlx::Error> {
        let token = Uuid::new_v4();
        let result = sqlx::query("UPDATE boards SET invite_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(pool)
            .await?;

        Ok((result.rows_affected() > 0).then_some(token))
    }

    pub async fn revoke_invite_token(pool: &PgPool, id: BoardId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE boards SET invite_token = NULL, updated_at = NOW() WHERE id = $1 AND invite_token IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
