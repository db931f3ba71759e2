/// Attachment metadata endpoints
///
/// - `POST /v1/cards/:card/attachments`: record an uploaded file
/// - `DELETE /v1/attachments/:attachment`
///
/// The bytes live in external storage; only the name and storage reference
/// are kept here.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
    middleware::session::CurrentUser,
};
use axum::{extract::State, http::StatusCode, Json};
use kanban_shared::{
    access::Operation,
    ids::{AttachmentId, CardId, ResourceRef},
    models::attachment::{Attachment, CreateAttachment},
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAttachmentRequest {
    #[validate(length(min = 1, max = 255, message = "File name must be 1 to 255 characters"))]
    pub file_name: String,

    #[validate(length(min = 1, max = 512, message = "Storage reference must be 1 to 512 characters"))]
    pub storage_ref: String,
}

pub async fn create_attachment(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(card_id): ApiPath<CardId>,
    ApiJson(req): ApiJson<CreateAttachmentRequest>,
) -> ApiResult<(StatusCode, Json<Attachment>)> {
    req.validate()?;
    state
        .resolver
        .require(current.user_id, ResourceRef::Card(card_id), &Operation::MutateContent)
        .await?;

    let attachment = Attachment::create(
        &state.db,
        card_id,
        current.user_id,
        CreateAttachment {
            file_name: req.file_name,
            storage_ref: req.storage_ref,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(attachment)))
}

pub async fn delete_attachment(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(attachment_id): ApiPath<AttachmentId>,
) -> ApiResult<StatusCode> {
    state
        .resolver
        .require(
            current.user_id,
            ResourceRef::Attachment(attachment_id),
            &Operation::MutateContent,
        )
        .await?;

    Attachment::delete(&state.db, attachment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
