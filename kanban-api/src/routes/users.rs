/// Account endpoints
///
/// - `POST /v1/users/signup`: create an account and log in
/// - `POST /v1/users/login`: log in
/// - `POST /v1/users/logout`: end the current session
/// - `GET /v1/users/me`: own profile
/// - `PUT /v1/users/me`: change name or avatar
/// - `PUT /v1/users/password`: change password, ending every other session
///
/// Login hands the password to the auth service, which owns the check; the
/// API only resolves the email to a user id first. Successful signup and
/// login set the session cookie.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    middleware::session::{clear_session_cookie, session_cookie, CurrentUser},
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use kanban_shared::{
    auth::password::{hash_password, validate_password_strength},
    models::user::{CreateUser, UpdateProfile, User, UserProfile},
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: Option<String>,

    /// `null` removes the avatar
    #[serde(default, deserialize_with = "kanban_shared::models::present")]
    #[validate(length(max = 512, message = "Avatar URL is too long"))]
    pub avatar_url: Option<Option<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub old_password: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Registers a user and logs them in
///
/// # Errors
///
/// - `409 Conflict`: email already registered
/// - `422 Unprocessable Entity`: validation failed
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<Response> {
    req.validate()?;
    validate_password_strength(&req.password)
        .map_err(|e| ApiError::invalid_field("password", e))?;

    let password_hash = hash_password(&req.password)?;
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            name: req.name,
            password_hash,
        },
    )
    .await?;

    let session_id = state.auth.create_session(user.id, &req.password).await?;
    tracing::info!(user_id = %user.id, "User signed up");

    with_session(&state, StatusCode::CREATED, &session_id, UserProfile::from(user))
}

/// Logs a user in by email and password
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let session_id = state
        .auth
        .create_session(user.id, &req.password)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Unauthorized(_) => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            other => other,
        })?;

    with_session(&state, StatusCode::OK, &session_id, UserProfile::from(user))
}

pub async fn logout(State(state): State<AppState>, current: CurrentUser) -> ApiResult<Response> {
    state.auth.delete_session(&current.session_id).await?;

    let cookie = clear_session_cookie(state.cookie_name(), state.secure_cookies())?;
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response())
}

pub async fn me(State(state): State<AppState>, current: CurrentUser) -> ApiResult<Json<UserProfile>> {
    let profile = UserProfile::find(&state.db, current.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(profile))
}

pub async fn update_me(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(req): ApiJson<UpdateMeRequest>,
) -> ApiResult<Json<UserProfile>> {
    req.validate()?;

    let user = User::update_profile(
        &state.db,
        current.user_id,
        UpdateProfile {
            name: req.name,
            avatar_url: req.avatar_url,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(user)))
}

/// Changes the caller's password
///
/// The current session survives; every other session of the user ends.
///
/// # Errors
///
/// - `401 Unauthorized`: wrong old password
/// - `422 Unprocessable Entity`: new password too weak
pub async fn change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    state
        .auth
        .change_password(&current.session_id, &req.old_password, &req.new_password)
        .await?;

    tracing::info!(user_id = %current.user_id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

fn with_session(
    state: &AppState,
    status: StatusCode,
    session_id: &str,
    profile: UserProfile,
) -> ApiResult<Response> {
    let cookie = session_cookie(state.cookie_name(), session_id, state.secure_cookies())?;
    Ok((status, [(header::SET_COOKIE, cookie)], Json(profile)).into_response())
}
