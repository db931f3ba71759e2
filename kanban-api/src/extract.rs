/// Extractors whose rejections use the API error body
///
/// Axum's own `Json` and `Path` reject with plain-text bodies; these wrap
/// them so a malformed body or a `card_45` in a `board` slot come back as
/// `{ "error": "bad_request", ... }` like every other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
