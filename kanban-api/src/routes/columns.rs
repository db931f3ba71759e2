/// Column endpoints
///
/// - `POST /v1/boards/:board/columns`: append a column
/// - `PUT /v1/columns/:column`: rename
/// - `DELETE /v1/columns/:column`: delete with its cards
/// - `PUT /v1/columns/:column/move`: reorder within the board
///
/// Placement is owned by the ordering store; columns are always numbered
/// `0..n-1` on their board.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    middleware::session::CurrentUser,
};
use axum::{extract::State, http::StatusCode, Json};
use kanban_shared::{
    access::Operation,
    ids::{BoardId, ColumnId, ResourceRef},
    models::column::Column,
    ordering::{self, MoveRequest},
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ColumnTitleRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,
}

/// Where to put a column: between `previous_id` and `next_id`
#[derive(Debug, Deserialize)]
pub struct MoveColumnRequest {
    /// Must be the column's own board when given
    #[serde(default)]
    pub new_board_id: Option<BoardId>,

    #[serde(default)]
    pub previous_id: Option<ColumnId>,

    #[serde(default)]
    pub next_id: Option<ColumnId>,
}

pub async fn create_column(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(board_id): ApiPath<BoardId>,
    ApiJson(req): ApiJson<ColumnTitleRequest>,
) -> ApiResult<(StatusCode, Json<Column>)> {
    req.validate()?;
    state
        .resolver
        .require(current.user_id, ResourceRef::Board(board_id), &Operation::MutateContent)
        .await?;

    let column = ordering::store::create_column(&state.db, board_id, &req.title).await?;
    Ok((StatusCode::CREATED, Json(column)))
}

pub async fn rename_column(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(column_id): ApiPath<ColumnId>,
    ApiJson(req): ApiJson<ColumnTitleRequest>,
) -> ApiResult<Json<Column>> {
    req.validate()?;
    state
        .resolver
        .require(current.user_id, ResourceRef::Column(column_id), &Operation::MutateContent)
        .await?;

    let column = Column::update_title(&state.db, column_id, &req.title)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", column_id)))?;
    Ok(Json(column))
}

pub async fn delete_column(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(column_id): ApiPath<ColumnId>,
) -> ApiResult<StatusCode> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Column(column_id), &Operation::MutateContent)
        .await?;

    ordering::store::delete_column(&state.db, column_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Moves a column and returns the board's columns in their new order
///
/// # Errors
///
/// - `400 Bad Request`: anchors not adjacent, anchor equal to the column,
///   or another board given as destination
/// - `404 Not Found`: an anchor column does not exist
pub async fn move_column(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(column_id): ApiPath<ColumnId>,
    ApiJson(req): ApiJson<MoveColumnRequest>,
) -> ApiResult<Json<Vec<Column>>> {
    let resolution = state
        .resolver
        .require(current.user_id, ResourceRef::Column(column_id), &Operation::MutateContent)
        .await?;

    let columns = ordering::move_column(
        &state.db,
        resolution.board_id,
        MoveRequest {
            target_id: column_id,
            new_container_id: req.new_board_id,
            previous_id: req.previous_id,
            next_id: req.next_id,
        },
    )
    .await?;

    Ok(Json(columns))
}
