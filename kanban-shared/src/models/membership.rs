/// Membership model and database operations
///
/// A membership grants one user one [`Role`] on one board. The absence of a
/// membership row is meaningful on its own: the access layer reports it as
/// `NotPermitted`, distinct from the board not existing.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE board_members (
///     board_id BIGINT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role board_role NOT NULL DEFAULT 'viewer',
///     added_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     updated_by BIGINT REFERENCES users(id) ON DELETE SET NULL,
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     visited_at TIMESTAMPTZ,
///     PRIMARY KEY (board_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use kanban_shared::access::role::Role;
/// use kanban_shared::ids::{BoardId, UserId};
/// use kanban_shared::models::membership::{CreateMembership, Membership};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let board_id = BoardId::new(1);
/// let user_id = UserId::new(2);
///
/// Membership::create(&pool, CreateMembership {
///     board_id,
///     user_id,
///     role: Role::Viewer,
///     added_by: Some(UserId::new(1)),
/// }).await?;
///
/// let role = Membership::get_role(&pool, board_id, user_id).await?;
/// assert_eq!(role, Some(Role::Viewer));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::access::role::Role;
use crate::ids::{BoardId, UserId};

/// One user's role on one board
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub board_id: BoardId,
    pub user_id: UserId,
    pub role: Role,

    /// Who added this member; `None` for the board creator
    pub added_by: Option<UserId>,

    /// Who last changed the role; `None` if never changed
    pub updated_by: Option<UserId>,

    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// When this member last opened the board
    pub visited_at: Option<DateTime<Utc>>,
}

/// Input for creating a membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub board_id: BoardId,
    pub user_id: UserId,

    /// Role to assign (defaults to viewer)
    #[serde(default = "default_role")]
    pub role: Role,

    pub added_by: Option<UserId>,
}

/// Outcome of a membership write conditioned on the member's role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardedWrite<T> {
    Done(T),

    /// The membership does not exist
    Missing,

    /// The member holds this role now, not the expected one
    RoleChanged(Role),
}

fn default_role() -> Role {
    Role::Viewer
}

const MEMBERSHIP_COLUMNS: &str =
    "board_id, user_id, role, added_by, updated_by, added_at, updated_at, visited_at";

impl Membership {
    /// Creates a membership
    ///
    /// Accepts any executor so board creation can run it inside its
    /// transaction.
    ///
    /// # Errors
    ///
    /// Fails with a unique violation when the user is already a member, or a
    /// foreign key violation when board or user is missing.
    pub async fn create<'e, E>(executor: E, data: CreateMembership) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Membership>(&format!(
            r#"
            INSERT INTO board_members (board_id, user_id, role, added_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            MEMBERSHIP_COLUMNS
        ))
        .bind(data.board_id)
        .bind(data.user_id)
        .bind(data.role)
        .bind(data.added_by)
        .fetch_one(executor)
        .await
    }

    pub async fn find(
        pool: &PgPool,
        board_id: BoardId,
        user_id: UserId,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Membership>(&format!(
            "SELECT {} FROM board_members WHERE board_id = $1 AND user_id = $2",
            MEMBERSHIP_COLUMNS
        ))
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Gets the user's role on the board, `None` when not a member
    pub async fn get_role(
        pool: &PgPool,
        board_id: BoardId,
        user_id: UserId,
    ) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_scalar::<_, Role>(
            "SELECT role FROM board_members WHERE board_id = $1 AND user_id = $2",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Changes a member's role and records who did it
    ///
    /// The write only lands while the member still holds `expected`, the
    /// role the change was authorized against.
    pub async fn update_role(
        pool: &PgPool,
        board_id: BoardId,
        user_id: UserId,
        expected: Role,
        role: Role,
        updated_by: UserId,
    ) -> Result<GuardedWrite<Self>, sqlx::Error> {
        let updated = sqlx::query_as::<_, Membership>(&format!(
            r#"
            UPDATE board_members
            SET role = $4, updated_by = $5, updated_at = NOW()
            WHERE board_id = $1 AND user_id = $2 AND role = $3
            RETURNING {}
            "#,
            MEMBERSHIP_COLUMNS
        ))
        .bind(board_id)
        .bind(user_id)
        .bind(expected)
        .bind(role)
        .bind(updated_by)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(membership) => Ok(GuardedWrite::Done(membership)),
            None => Self::missed(pool, board_id, user_id).await,
        }
    }

    /// Records a visit of `user_id` to the board
    pub async fn touch_visit(
        pool: &PgPool,
        board_id: BoardId,
        user_id: UserId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE board_members SET visited_at = NOW() WHERE board_id = $1 AND user_id = $2")
            .bind(board_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Removes a member and their card assignments on the board
    ///
    /// Like [`update_role`](Self::update_role), only while the member still
    /// holds `expected`.
    pub async fn delete(
        pool: &PgPool,
        board_id: BoardId,
        user_id: UserId,
        expected: Role,
    ) -> Result<GuardedWrite<()>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query(
            "DELETE FROM board_members WHERE board_id = $1 AND user_id = $2 AND role = $3",
        )
        .bind(board_id)
        .bind(user_id)
        .bind(expected)
        .execute(&mut *tx)
        .await?;

        if removed.rows_affected() == 0 {
            tx.rollback().await?;
            return Self::missed(pool, board_id, user_id).await;
        }

        let unassigned = sqlx::query(
            r#"
            DELETE FROM card_assignees a
            USING cards c, columns col
            WHERE a.card_id = c.id AND c.column_id = col.id
              AND col.board_id = $1 AND a.user_id = $2
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            board_id = %board_id,
            user_id = %user_id,
            unassigned = unassigned.rows_affected(),
            "Membership deleted"
        );
        Ok(GuardedWrite::Done(()))
    }

    /// Tells a vanished membership from one whose role moved on
    async fn missed<T>(
        pool: &PgPool,
        board_id: BoardId,
        user_id: UserId,
    ) -> Result<GuardedWrite<T>, sqlx::Error> {
        Ok(match Self::get_role(pool, board_id, user_id).await? {
            Some(current) => GuardedWrite::RoleChanged(current),
            None => GuardedWrite::Missing,
        })
    }

    /// Lists the members of a board in the order they joined
    pub async fn list_by_board(pool: &PgPool, board_id: BoardId) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Membership>(&format!(
            "SELECT {} FROM board_members WHERE board_id = $1 ORDER BY added_at ASC, user_id ASC",
            MEMBERSHIP_COLUMNS
        ))
        .bind(board_id)
        .fetch_all(pool)
        .await
    }
}
