/// Comment endpoints
///
/// - `POST /v1/cards/:card/comments`
/// - `PUT /v1/comments/:comment`
/// - `DELETE /v1/comments/:comment`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    middleware::session::CurrentUser,
};
use axum::{extract::State, http::StatusCode, Json};
use kanban_shared::{
    access::Operation,
    ids::{CardId, CommentId, ResourceRef},
    models::comment::Comment,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 5000, message = "Comment must be 1 to 5000 characters"))]
    pub text: String,
}

pub async fn create_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    req.validate()?;
    state
        .resolver
        .require(current.user_id, ResourceRef::Card(card_id), &Operation::MutateContent)
        .await?;

    let comment = Comment::create(&state.db, card_id, current.user_id, &req.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(comment_id): ApiPath<CommentId>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> ApiResult<Json<Comment>> {
    req.validate()?;
    state
        .resolver
        .require(current.user_id, ResourceRef::Comment(comment_id), &Operation::MutateContent)
        .await?;

    let comment = Comment::update_text(&state.db, comment_id, &req.text)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", comment_id)))?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(comment_id): ApiPath<CommentId>,
) -> ApiResult<StatusCode> {
    state
        .resolver
        .require(current.user_id, ResourceRef::Comment(comment_id), &Operation::MutateContent)
        .await?;

    Comment::delete(&state.db, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
