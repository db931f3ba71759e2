/// Role resolution for board resources
///
/// Given a user and any [`ResourceRef`], the resolver walks up to the owning
/// board and returns the user's role there, together with every id on the way
/// (column and card, when the resource sits below them). Each kind has its own
/// join, run as a single query that also left-joins the membership row, so a
/// missing resource and a missing membership are told apart without a second
/// round trip:
///
/// - resource row absent → [`CoreError::NotFound`]
/// - resource present, user not a member → [`CoreError::NotPermitted`]
///
/// # Example
///
/// ```no_run
/// use kanban_shared::access::gate::Operation;
/// use kanban_shared::access::resolver::RoleResolver;
/// use kanban_shared::ids::{CardId, ResourceRef, UserId};
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), kanban_shared::error::CoreError> {
/// let resolver = RoleResolver::new(pool);
/// let user = UserId::new(7);
///
/// let resolution = resolver
///     .require(user, ResourceRef::Card(CardId::new(45)), &Operation::MutateContent)
///     .await?;
/// println!("card lives on {} in {:?}", resolution.board_id, resolution.column_id);
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use sqlx::PgPool;

use super::gate::{authorize, Operation};
use super::role::Role;
use crate::error::{CoreError, CoreResult};
use crate::ids::{BoardId, CardId, ColumnId, ResourceRef, UserId};
use crate::models::membership::Membership;
use crate::models::user::UserProfile;

/// Where a resource lives and what the user may do there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub role: Role,
    pub board_id: BoardId,
    pub column_id: Option<ColumnId>,
    pub card_id: Option<CardId>,
}

/// [`Resolution`] plus the membership row and the people who shaped it
#[derive(Debug, Clone, Serialize)]
pub struct VerboseResolution {
    #[serde(flatten)]
    pub resolution: Resolution,
    pub membership: Membership,
    pub added_by: Option<UserProfile>,
    pub updated_by: Option<UserProfile>,
}

#[derive(Debug, sqlx::FromRow)]
struct PathRow {
    board_id: BoardId,
    column_id: Option<ColumnId>,
    card_id: Option<CardId>,
    role: Option<Role>,
}

/// Resolves user roles on boards from the relational store
#[derive(Debug, Clone)]
pub struct RoleResolver {
    pool: PgPool,
}

impl RoleResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolves `user`'s role on the board owning `resource`
    pub async fn resolve(&self, user: UserId, resource: ResourceRef) -> CoreResult<Resolution> {
        let row = sqlx::query_as::<_, PathRow>(path_query(&resource))
            .bind(resource.raw_id())
            .bind(user)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::not_found(resource))?;

        let role = row.role.ok_or_else(|| {
            tracing::debug!(
                user_id = %user,
                board_id = %row.board_id,
                resource = %resource,
                "User is not a member of the board"
            );
            CoreError::not_permitted(format!("{} is not a member of {}", user, row.board_id))
        })?;

        Ok(Resolution {
            role,
            board_id: row.board_id,
            column_id: row.column_id,
            card_id: row.card_id,
        })
    }

    /// Like [`resolve`](Self::resolve), also loading the membership row and
    /// the profiles of whoever added the user and last changed their role
    pub async fn resolve_verbose(
        &self,
        user: UserId,
        resource: ResourceRef,
    ) -> CoreResult<VerboseResolution> {
        let resolution = self.resolve(user, resource).await?;

        let membership = Membership::find(&self.pool, resolution.board_id, user)
            .await?
            .ok_or_else(|| {
                CoreError::not_permitted(format!("{} is not a member of {}", user, resolution.board_id))
            })?;

        let added_by = match membership.added_by {
            Some(id) => UserProfile::find(&self.pool, id).await?,
            None => None,
        };
        let updated_by = match membership.updated_by {
            Some(id) => UserProfile::find(&self.pool, id).await?,
            None => None,
        };

        Ok(VerboseResolution {
            resolution,
            membership,
            added_by,
            updated_by,
        })
    }

    /// Resolves and then checks `operation` against the resolved role
    pub async fn require(
        &self,
        user: UserId,
        resource: ResourceRef,
        operation: &Operation,
    ) -> CoreResult<Resolution> {
        let resolution = self.resolve(user, resource).await?;
        authorize(operation, resolution.role)?;
        Ok(resolution)
    }

    /// Role of another member of a board
    ///
    /// Used for the target side of membership changes; a missing membership
    /// is `NotFound` here since the target, not the caller, is absent.
    pub async fn member_role(&self, board_id: BoardId, member: UserId) -> CoreResult<Role> {
        Membership::get_role(&self.pool, board_id, member)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("{} on {}", member, board_id)))
    }
}

/// Kind-specific path query; `$1` is the resource id, `$2` the user id
fn path_query(resource: &ResourceRef) -> &'static str {
    match resource {
        ResourceRef::Board(_) => {
            r#"
            SELECT b.id AS board_id, NULL::BIGINT AS column_id, NULL::BIGINT AS card_id, m.role
            FROM boards b
            LEFT JOIN board_members m ON m.board_id = b.id AND m.user_id = $2
            WHERE b.id = $1
            "#
        }
        ResourceRef::Column(_) => {
            r#"
            SELECT col.board_id, col.id AS column_id, NULL::BIGINT AS card_id, m.role
            FROM columns col
            LEFT JOIN board_members m ON m.board_id = col.board_id AND m.user_id = $2
            WHERE col.id = $1
            "#
        }
        ResourceRef::Card(_) => {
            r#"
            SELECT col.board_id, c.column_id, c.id AS card_id, m.role
            FROM cards c
            JOIN columns col ON col.id = c.column_id
            LEFT JOIN board_members m ON m.board_id = col.board_id AND m.user_id = $2
            WHERE c.id = $1
            "#
        }
        ResourceRef::Comment(_) => {
            r#"
            SELECT col.board_id, c.column_id, c.id AS card_id, m.role
            FROM comments x
            JOIN cards c ON c.id = x.card_id
            JOIN columns col ON col.id = c.column_id
            LEFT JOIN board_members m ON m.board_id = col.board_id AND m.user_id = $2
            WHERE x.id = $1
            "#
        }
        ResourceRef::ChecklistField(_) => {
            r#"
            SELECT col.board_id, c.column_id, c.id AS card_id, m.role
            FROM checklist_fields x
            JOIN cards c ON c.id = x.card_id
            JOIN columns col ON col.id = c.column_id
            LEFT JOIN board_members m ON m.board_id = col.board_id AND m.user_id = $2
            WHERE x.id = $1
            "#
        }
        ResourceRef::Attachment(_) => {
            r#"
            SELECT col.board_id, c.column_id, c.id AS card_id, m.role
            FROM attachments x
            JOIN cards c ON c.id = x.card_id
            JOIN columns col ON col.id = c.column_id
            LEFT JOIN board_members m ON m.board_id = col.board_id AND m.user_id = $2
            WHERE x.id = $1
            "#
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{AttachmentId, ChecklistFieldId, CommentId};

    #[test]
    fn test_path_query_starts_from_resource_table() {
        let cases = [
            (ResourceRef::Board(BoardId::new(1)), "FROM boards b"),
            (ResourceRef::Column(ColumnId::new(1)), "FROM columns col"),
            (ResourceRef::Card(CardId::new(1)), "FROM cards c"),
            (ResourceRef::Comment(CommentId::new(1)), "FROM comments x"),
            (ResourceRef::ChecklistField(ChecklistFieldId::new(1)), "FROM checklist_fields x"),
            (ResourceRef::Attachment(AttachmentId::new(1)), "FROM attachments x"),
        ];

        for (resource, from) in cases {
            let query = path_query(&resource);
            assert!(query.contains(from), "{} query should read {}", resource.kind(), from);
            assert!(query.contains("LEFT JOIN board_members"));
        }
    }

    #[test]
    fn test_resolution_serializes_prefixed_ids() {
        let resolution = Resolution {
            role: Role::Editor,
            board_id: BoardId::new(3),
            column_id: Some(ColumnId::new(8)),
            card_id: None,
        };

        let json = serde_json::to_value(resolution).unwrap();
        assert_eq!(json["role"], "editor");
        assert_eq!(json["board_id"], "board_3");
        assert_eq!(json["column_id"], "column_8");
        assert!(json["card_id"].is_null());
    }
}
