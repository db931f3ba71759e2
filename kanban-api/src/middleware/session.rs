/// Session cookie authentication
///
/// [`session_auth_layer`] reads the session cookie, asks the auth service who
/// owns it (`CheckSession`) and stores a [`CurrentUser`] in the request
/// extensions. Handlers take `CurrentUser` as an extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use kanban_shared::ids::UserId;
use kanban_shared::session::DEFAULT_SESSION_TTL;

use crate::app::AppState;
use crate::error::ApiError;

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,

    /// Raw session id from the cookie, needed for logout and password change
    pub session_id: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Not logged in".to_string()))
    }
}

/// Rejects requests without a live session
pub async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session_id = read_cookie(req.headers(), &state.config.api.session_cookie_name)
        .ok_or_else(|| ApiError::Unauthorized("Missing session cookie".to_string()))?;

    let user_id = state.auth.check_session(&session_id).await?;

    req.extensions_mut().insert(CurrentUser {
        user_id,
        session_id,
    });

    Ok(next.run(req).await)
}

/// Value of cookie `name` from the `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a fresh session
pub fn session_cookie(name: &str, session_id: &str, secure: bool) -> Result<HeaderValue, ApiError> {
    cookie_header(name, session_id, DEFAULT_SESSION_TTL.as_secs(), secure)
}

/// `Set-Cookie` value that makes the browser drop the session
pub fn clear_session_cookie(name: &str, secure: bool) -> Result<HeaderValue, ApiError> {
    cookie_header(name, "", 0, secure)
}

fn cookie_header(name: &str, value: &str, max_age: u64, secure: bool) -> Result<HeaderValue, ApiError> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("Invalid cookie header: {}", e)))
}
