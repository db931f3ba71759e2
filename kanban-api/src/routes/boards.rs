/// Board endpoints
///
/// - `POST /v1/boards`: create a board; the caller becomes its admin
/// - `GET /v1/boards`: boards of the caller, most recently visited first
/// - `GET /v1/boards/:board`: board with its columns and cards
/// - `PUT /v1/boards/:board`: rename or change the background
/// - `DELETE /v1/boards/:board`: delete with everything on it
/// - `POST /v1/boards/:board/invite`: issue a fresh invite link
/// - `DELETE /v1/boards/:board/invite`: revoke the invite link
/// - `POST /v1/invite/:token`: join a board as viewer

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    middleware::session::CurrentUser,
};
use axum::{extract::State, http::StatusCode, Json};
use kanban_shared::{
    access::{authorize, Operation, Role},
    ids::{BoardId, ResourceRef},
    models::{
        board::{Board, BoardSummary, CreateBoard, UpdateBoard},
        card::Card,
        column::Column,
        membership::{CreateMembership, Membership},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,

    #[validate(length(max = 512, message = "Background reference is too long"))]
    pub background: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: Option<String>,

    /// `null` removes the background
    #[serde(default, deserialize_with = "kanban_shared::models::present")]
    #[validate(length(max = 512, message = "Background reference is too long"))]
    pub background: Option<Option<String>>,
}

/// Full board as seen by one member
#[derive(Debug, Serialize)]
pub struct BoardView {
    #[serde(flatten)]
    pub board: Board,

    /// The caller's role
    pub role: Role,

    pub columns: Vec<ColumnView>,
}

#[derive(Debug, Serialize)]
pub struct ColumnView {
    #[serde(flatten)]
    pub column: Column,
    pub cards: Vec<Card>,
}

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub invite_token: Uuid,
}

pub async fn create_board(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(req): ApiJson<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    req.validate()?;

    let board = Board::create(
        &state.db,
        current.user_id,
        CreateBoard {
            name: req.name,
            background: req.background,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn list_boards(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<BoardSummary>>> {
    Ok(Json(Board::list_for_user(&state.db, current.user_id).await?))
}

/// Opens a board and records the visit
///
/// The invite token is only shown to members who may manage it.
pub async fn get_board(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(board_id): ApiPath<BoardId>,
) -> ApiResult<Json<BoardView>> {
    let resolution = state
        .resolver
        .require(current.user_id, ResourceRef::Board(board_id), &Operation::Read)
        .await?;

    Membership::touch_visit(&state.db, board_id, current.user_id).await?;

    let mut board = Board::find_by_id(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", board_id)))?;
    if authorize(&Operation::RenameBoard, resolution.role).is_err() {
        board.invite_token = None;
    }

    let columns = Column::list_by_board(&state.db, board_id).await?;
    let cards = Card::list_by_board(&state.db, board_id).await?;

    Ok(Json(BoardView {
        board,
        role: resolution.role,
        columns: group_cards(columns, cards),
    }))
}

/// Renames the board or changes its background
///
/// Renaming is a board setting (admin, editor_chief); a background-only
/// change is ordinary content editing.
pub async fn update_board(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(board_id): ApiPath<BoardId>,
    ApiJson(req): ApiJson<UpdateBoardRequest>,
) -> ApiResult<Json<Board>> {
    req.validate()?;

    let operation = if req.name.is_some() {
        Operation::RenameBoard
    } else {
        Operation::MutateContent
    };
    state
        .resolver
        .require(current.user_id, ResourceRef::Board(board_id), &operation)
        .await?;

    let board = Board::update(
        &state.db,
        board_id,
        UpdateBoard {
            name: req.name,
            background: req.background,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("{} not found", board_id)))?;

    Ok(Json(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(board_id): ApiPath<BoardId>,
) -> ApiResult<StatusCode> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Board(board_id), &Operation::DeleteBoard)
        .await?;

    Board::delete(&state.db, board_id).await?;
    tracing::info!(board_id = %board_id, user_id = %current.user_id, "Board deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Issues a new invite link, invalidating the previous one
pub async fn create_invite(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(board_id): ApiPath<BoardId>,
) -> ApiResult<Json<InviteResponse>> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Board(board_id), &Operation::RenameBoard)
        .await?;

    let invite_token = Board::rotate_invite_token(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", board_id)))?;

    Ok(Json(InviteResponse { invite_token }))
}

pub async fn revoke_invite(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(board_id): ApiPath<BoardId>,
) -> ApiResult<StatusCode> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Board(board_id), &Operation::RenameBoard)
        .await?;

    if !Board::revoke_invite_token(&state.db, board_id).await? {
        return Err(ApiError::NotFound("No active invite link".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Joins the board behind an invite link as viewer
///
/// Existing members keep their role and get `200`; new members get `201`.
pub async fn join_by_invite(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(token): ApiPath<Uuid>,
) -> ApiResult<(StatusCode, Json<Membership>)> {
    let board = Board::find_by_invite_token(&state.db, token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite link not found".to_string()))?;

    if let Some(existing) = Membership::find(&state.db, board.id, current.user_id).await? {
        return Ok((StatusCode::OK, Json(existing)));
    }

    let membership = Membership::create(
        &state.db,
        CreateMembership {
            board_id: board.id,
            user_id: current.user_id,
            role: Role::Viewer,
            added_by: None,
        },
    )
    .await?;

    tracing::info!(board_id = %board.id, user_id = %current.user_id, "Joined board by invite");
    Ok((StatusCode::CREATED, Json(membership)))
}

/// Attaches each card to its column
///
/// Both inputs are in display order, so cards stay in order inside each
/// column.
fn group_cards(columns: Vec<Column>, cards: Vec<Card>) -> Vec<ColumnView> {
    let mut views: Vec<ColumnView> = columns
        .into_iter()
        .map(|column| ColumnView {
            column,
            cards: Vec::new(),
        })
        .collect();

    for card in cards {
        if let Some(view) = views.iter_mut().find(|v| v.column.id == card.column_id) {
            view.cards.push(card);
        }
    }
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kanban_shared::ids::{CardId, ColumnId};

    fn column(id: i64, order_index: i32) -> Column {
        Column {
            id: ColumnId::new(id),
            board_id: BoardId::new(1),
            title: format!("Column {}", id),
            order_index,
            created_at: Utc::now(),
        }
    }

    fn card(id: i64, column_id: i64, order_index: i32) -> Card {
        Card {
            id: CardId::new(id),
            column_id: ColumnId::new(column_id),
            title: format!("Card {}", id),
            description: String::new(),
            order_index,
            deadline: None,
            done: false,
            cover: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            has_checklist: false,
            has_attachments: false,
            has_assignees: false,
            has_comments: false,
        }
    }

    #[test]
    fn test_group_cards_keeps_order() {
        let views = group_cards(
            vec![column(10, 0), column(20, 1), column(30, 2)],
            vec![card(1, 10, 0), card(2, 10, 1), card(3, 30, 0)],
        );

        let ids: Vec<Vec<i64>> = views
            .iter()
            .map(|v| v.cards.iter().map(|c| c.id.get()).collect())
            .collect();
        assert_eq!(ids, vec![vec![1, 2], vec![], vec![3]]);
    }

    #[test]
    fn test_board_request_validation() {
        let empty = CreateBoardRequest {
            name: String::new(),
            background: None,
        };
        assert!(empty.validate().is_err());

        let background_only = UpdateBoardRequest {
            name: None,
            background: Some(Some("bg/forest.jpg".to_string())),
        };
        assert!(background_only.validate().is_ok());

        let cleared: UpdateBoardRequest = serde_json::from_str(r#"{"background": null}"#).unwrap();
        assert_eq!(cleared.background, Some(None));
        assert!(cleared.validate().is_ok());
    }
}
