/// Board membership endpoints
///
/// - `GET /v1/boards/:board/members`: members with their profiles
/// - `POST /v1/boards/:board/members`: add a user as viewer
/// - `PUT /v1/boards/:board/members/:user`: change a member's role
/// - `DELETE /v1/boards/:board/members/:user`: remove a member or leave
///
/// Role changes and removals follow strict dominance: below admin, an actor
/// can only touch members ranked below themself and only grant roles ranked
/// below their own. Anyone may leave.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    middleware::session::CurrentUser,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use kanban_shared::{
    access::{authorize, Operation, Role},
    ids::{BoardId, ResourceRef, UserId},
    models::{
        membership::{CreateMembership, GuardedWrite, Membership},
        user::UserProfile,
    },
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One member with the people who shaped their membership
#[derive(Debug, Serialize)]
pub struct MemberView {
    pub user: UserProfile,
    pub role: Role,
    pub added_at: DateTime<Utc>,
    pub visited_at: Option<DateTime<Utc>>,
    pub added_by: Option<UserProfile>,
    pub updated_by: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    /// One of `viewer`, `editor`, `editor_chief`, `admin`
    pub role: String,
}

pub async fn list_members(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(board_id): ApiPath<BoardId>,
) -> ApiResult<Json<Vec<MemberView>>> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Board(board_id), &Operation::Read)
        .await?;

    let memberships = Membership::list_by_board(&state.db, board_id).await?;

    let mut ids: Vec<UserId> = memberships
        .iter()
        .flat_map(|m| [Some(m.user_id), m.added_by, m.updated_by])
        .flatten()
        .collect();
    ids.sort();
    ids.dedup();

    let profiles: HashMap<UserId, UserProfile> = UserProfile::find_many(&state.db, &ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(Json(member_views(memberships, &profiles)))
}

/// Adds an existing user to the board as viewer
///
/// # Errors
///
/// - `404 Not Found`: no such user
/// - `409 Conflict`: already a member
pub async fn add_member(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(board_id): ApiPath<BoardId>,
    ApiJson(req): ApiJson<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<Membership>)> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Board(board_id), &Operation::AddMember)
        .await?;

    if UserProfile::find(&state.db, req.user_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("{} not found", req.user_id)));
    }
    if Membership::find(&state.db, board_id, req.user_id).await?.is_some() {
        return Err(ApiError::Conflict(format!("{} is already a member", req.user_id)));
    }

    let membership = Membership::create(
        &state.db,
        CreateMembership {
            board_id,
            user_id: req.user_id,
            role: Role::Viewer,
            added_by: Some(current.user_id),
        },
    )
    .await?;

    tracing::info!(
        board_id = %board_id,
        user_id = %req.user_id,
        added_by = %current.user_id,
        "Member added"
    );
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn change_role(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath((board_id, member)): ApiPath<(BoardId, UserId)>,
    ApiJson(req): ApiJson<ChangeRoleRequest>,
) -> ApiResult<Json<Membership>> {
    let new_role: Role = req.role.parse()?;

    let actor = state
        .resolver
        .resolve(current.user_id, ResourceRef::Board(board_id))
        .await?;
    let target_current = state.resolver.member_role(board_id, member).await?;

    authorize(
        &Operation::ChangeRole {
            target_current,
            new_role,
        },
        actor.role,
    )?;

    let membership = settle(
        Membership::update_role(
            &state.db,
            board_id,
            member,
            target_current,
            new_role,
            current.user_id,
        )
        .await?,
        board_id,
        member,
    )?;

    tracing::info!(
        board_id = %board_id,
        user_id = %member,
        from = %target_current,
        to = %new_role,
        changed_by = %current.user_id,
        "Member role changed"
    );
    Ok(Json(membership))
}

pub async fn remove_member(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath((board_id, member)): ApiPath<(BoardId, UserId)>,
) -> ApiResult<StatusCode> {
    let actor = state
        .resolver
        .resolve(current.user_id, ResourceRef::Board(board_id))
        .await?;
    let target_role = state.resolver.member_role(board_id, member).await?;

    authorize(
        &Operation::RemoveMember {
            is_self: member == current.user_id,
            target_role,
        },
        actor.role,
    )?;

    settle(
        Membership::delete(&state.db, board_id, member, target_role).await?,
        board_id,
        member,
    )?;

    tracing::info!(
        board_id = %board_id,
        user_id = %member,
        removed_by = %current.user_id,
        "Member removed"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Turns a role-guarded write into the handler result
///
/// A role that changed between the check and the write is a conflict: the
/// caller was authorized against a role the member no longer has.
fn settle<T>(write: GuardedWrite<T>, board_id: BoardId, member: UserId) -> ApiResult<T> {
    match write {
        GuardedWrite::Done(value) => Ok(value),
        GuardedWrite::Missing => Err(ApiError::NotFound(format!(
            "{} on {} not found",
            member, board_id
        ))),
        GuardedWrite::RoleChanged(now) => Err(ApiError::Conflict(format!(
            "{} is now {} on {}; reload and retry",
            member, now, board_id
        ))),
    }
}

fn member_views(memberships: Vec<Membership>, profiles: &HashMap<UserId, UserProfile>) -> Vec<MemberView> {
    let lookup = |id: Option<UserId>| id.and_then(|id| profiles.get(&id).cloned());

    memberships
        .into_iter()
        .filter_map(|m| {
            Some(MemberView {
                user: profiles.get(&m.user_id)?.clone(),
                role: m.role,
                added_at: m.added_at,
                visited_at: m.visited_at,
                added_by: lookup(m.added_by),
                updated_by: lookup(m.updated_by),
            })
        })
        .collect()
}
