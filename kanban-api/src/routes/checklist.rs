/// Checklist endpoints
///
/// - `POST /v1/cards/:card/checklist`
/// - `PUT /v1/checklist/:field`
/// - `DELETE /v1/checklist/:field`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    middleware::session::CurrentUser,
};
use axum::{extract::State, http::StatusCode, Json};
use kanban_shared::{
    access::Operation,
    ids::{CardId, ChecklistFieldId, ResourceRef},
    models::checklist::{ChecklistField, UpdateChecklistField},
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFieldRequest {
    #[validate(length(min = 1, max = 500, message = "Text must be 1 to 500 characters"))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFieldRequest {
    #[validate(length(min = 1, max = 500, message = "Text must be 1 to 500 characters"))]
    pub text: Option<String>,

    pub done: Option<bool>,
}

pub async fn create_field(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(req): ApiJson<CreateFieldRequest>,
) -> ApiResult<(StatusCode, Json<ChecklistField>)> {
    req.validate()?;
    state
        .resolver
        .require(current.user_id, ResourceRef::Card(card_id), &Operation::MutateContent)
        .await?;

    let field = ChecklistField::create(&state.db, card_id, &req.text).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

pub async fn update_field(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(field_id): ApiPath<ChecklistFieldId>,
    ApiJson(req): ApiJson<UpdateFieldRequest>,
) -> ApiResult<Json<ChecklistField>> {
    req.validate()?;
    state
        .resolver
        .require(
            current.user_id,
            ResourceRef::ChecklistField(field_id),
            &Operation::MutateContent,
        )
        .await?;

    let field = ChecklistField::update(
        &state.db,
        field_id,
        UpdateChecklistField {
            text: req.text,
            done: req.done,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("{} not found", field_id)))?;

    Ok(Json(field))
}

pub async fn delete_field(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(field_id): ApiPath<ChecklistFieldId>,
) -> ApiResult<StatusCode> {
    state
        .resolver
        .require(
            current.user_id,
            ResourceRef::ChecklistField(field_id),
            &Operation::MutateContent,
        )
        .await?;

    ChecklistField::delete(&state.db, field_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
