/// Card endpoints
///
/// - `POST /v1/columns/:column/cards`: append a card
/// - `GET /v1/cards/:card`: card with comments, checklist, attachments, assignees
/// - `PUT /v1/cards/:card`: edit fields
/// - `DELETE /v1/cards/:card`: delete with its content
/// - `PUT /v1/cards/:card/move`: reorder, or move to another column of the board

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    middleware::session::CurrentUser,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use kanban_shared::{
    access::Operation,
    ids::{CardId, ColumnId, ResourceRef},
    models::{
        assignment::Assignment,
        attachment::Attachment,
        card::{Card, CreateCard, UpdateCard},
        checklist::ChecklistField,
        comment::Comment,
        user::UserProfile,
    },
    ordering::{self, MoveRequest},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCardRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: String,

    pub deadline: Option<DateTime<Utc>>,
}

/// Card patch; absent fields stay, `null` clears `deadline` and `cover`
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCardRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1 to 255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "kanban_shared::models::present")]
    pub deadline: Option<Option<DateTime<Utc>>>,

    pub done: Option<bool>,

    #[serde(default, deserialize_with = "kanban_shared::models::present")]
    #[validate(length(max = 512, message = "Cover reference is too long"))]
    pub cover: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct MoveCardRequest {
    /// Another column of the same board; absent keeps the column
    #[serde(default)]
    pub new_column_id: Option<ColumnId>,

    #[serde(default)]
    pub previous_id: Option<CardId>,

    #[serde(default)]
    pub next_id: Option<CardId>,
}

/// Card with everything hanging off it
#[derive(Debug, Serialize)]
pub struct CardView {
    #[serde(flatten)]
    pub card: Card,
    pub comments: Vec<Comment>,
    pub checklist: Vec<ChecklistField>,
    pub attachments: Vec<Attachment>,
    pub assignees: Vec<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct ColumnCards {
    pub column_id: ColumnId,
    pub cards: Vec<Card>,
}

/// Every column a move touched, in its new order
#[derive(Debug, Serialize)]
pub struct MoveCardResponse {
    pub source: ColumnCards,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<ColumnCards>,
}

pub async fn create_card(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(column_id): ApiPath<ColumnId>,
    ApiJson(req): ApiJson<CreateCardRequest>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    req.validate()?;
    state
        .resolver
        .require(current.user_id, ResourceRef::Column(column_id), &Operation::MutateContent)
        .await?;

    let card = ordering::store::create_card(
        &state.db,
        column_id,
        CreateCard {
            title: req.title,
            description: req.description,
            deadline: req.deadline,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn get_card(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(card_id): ApiPath<CardId>,
) -> ApiResult<Json<CardView>> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Card(card_id), &Operation::Read)
        .await?;

    let card = Card::find_by_id(&state.db, card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", card_id)))?;

    let (comments, checklist, attachments, assignees) = tokio::try_join!(
        Comment::list_by_card(&state.db, card_id),
        ChecklistField::list_by_card(&state.db, card_id),
        Attachment::list_by_card(&state.db, card_id),
        Assignment::assignees(&state.db, card_id),
    )?;

    Ok(Json(CardView {
        card,
        comments,
        checklist,
        attachments,
        assignees,
    }))
}

pub async fn update_card(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(req): ApiJson<UpdateCardRequest>,
) -> ApiResult<Json<Card>> {
    req.validate()?;
    state
        .resolver
        .require(current.user_id, ResourceRef::Card(card_id), &Operation::MutateContent)
        .await?;

    let card = Card::update(
        &state.db,
        card_id,
        UpdateCard {
            title: req.title,
            description: req.description,
            deadline: req.deadline,
            done: req.done,
            cover: req.cover,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("{} not found", card_id)))?;

    Ok(Json(card))
}

pub async fn delete_card(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(card_id): ApiPath<CardId>,
) -> ApiResult<StatusCode> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Card(card_id), &Operation::MutateContent)
        .await?;

    ordering::store::delete_card(&state.db, card_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Moves a card and returns the affected columns
///
/// # Errors
///
/// - `400 Bad Request`: destination on another board, anchors not adjacent,
///   or anchor equal to the card
/// - `404 Not Found`: destination column or an anchor card does not exist
pub async fn move_card(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(req): ApiJson<MoveCardRequest>,
) -> ApiResult<Json<MoveCardResponse>> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Card(card_id), &Operation::MutateContent)
        .await?;

    let moved = ordering::move_card(
        &state.db,
        MoveRequest {
            target_id: card_id,
            new_container_id: req.new_column_id,
            previous_id: req.previous_id,
            next_id: req.next_id,
        },
    )
    .await?;

    let source = ColumnCards {
        column_id: moved.source_column,
        cards: Card::list_by_column(&state.db, moved.source_column).await?,
    };
    let destination = if moved.destination_column != moved.source_column {
        Some(ColumnCards {
            column_id: moved.destination_column,
            cards: Card::list_by_column(&state.db, moved.destination_column).await?,
        })
    } else {
        None
    };

    Ok(Json(MoveCardResponse {
        source,
        destination,
    }))
}
