/// Card assignment endpoints
///
/// - `PUT /v1/cards/:card/assignees/:user`: assign a board member
/// - `DELETE /v1/cards/:card/assignees/:user`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiPath,
    middleware::session::CurrentUser,
};
use axum::{extract::State, http::StatusCode};
use kanban_shared::{
    access::Operation,
    ids::{CardId, ResourceRef, UserId},
    models::assignment::{AssignOutcome, Assignment},
};

/// Assigns `user` to the card
///
/// `201` on a new assignment, `200` when it already existed.
///
/// # Errors
///
/// - `400 Bad Request`: `user` is not a member of the card's board
pub async fn assign(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath((card_id, user_id)): ApiPath<(CardId, UserId)>,
) -> ApiResult<StatusCode> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Card(card_id), &Operation::MutateContent)
        .await?;

    match Assignment::assign(&state.db, card_id, user_id, current.user_id).await? {
        AssignOutcome::Assigned => Ok(StatusCode::CREATED),
        AssignOutcome::AlreadyAssigned => Ok(StatusCode::OK),
        AssignOutcome::NotBoardMember => Err(ApiError::BadRequest(format!(
            "{} is not a member of the card's board",
            user_id
        ))),
    }
}

pub async fn unassign(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath((card_id, user_id)): ApiPath<(CardId, UserId)>,
) -> ApiResult<StatusCode> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Card(card_id), &Operation::MutateContent)
        .await?;

    if !Assignment::unassign(&state.db, card_id, user_id).await? {
        return Err(ApiError::NotFound(format!("{} is not assigned to {}", user_id, card_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
