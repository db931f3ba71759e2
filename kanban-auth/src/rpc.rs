/// HTTP routing for the authentication protocol
///
/// # Endpoints
///
/// ```text
/// POST /rpc/CreateSession   {user_id, password}                     → {status, session_id?}
/// POST /rpc/CheckSession    {session_id}                            → {status, user_id?}
/// POST /rpc/DeleteSession   {session_id}                            → {status}
/// POST /rpc/ChangePassword  {old_password, new_password, session_id} → {status}
/// ```
///
/// Every expected outcome is a `200` with the status in the body. Only
/// `internal_error` is also reported as HTTP `500`.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use kanban_shared::auth::protocol::{
    ChangePasswordRequest, CheckSessionRequest, CheckSessionResponse, CreateSessionRequest,
    CreateSessionResponse, DeleteSessionRequest, RpcStatus, StatusResponse, CHANGE_PASSWORD_PATH,
    CHECK_SESSION_PATH, CREATE_SESSION_PATH, DELETE_SESSION_PATH,
};
use kanban_shared::error::CoreError;
use kanban_shared::session::SessionStore;
use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::service::AuthService;

type Service<C, S> = Arc<AuthService<C, S>>;

/// Builds the protocol router around a shared service
pub fn router<C, S>(service: Service<C, S>) -> Router
where
    C: CredentialStore + 'static,
    S: SessionStore + 'static,
{
    Router::new()
        .route(CREATE_SESSION_PATH, post(create_session::<C, S>))
        .route(CHECK_SESSION_PATH, post(check_session::<C, S>))
        .route(DELETE_SESSION_PATH, post(delete_session::<C, S>))
        .route(CHANGE_PASSWORD_PATH, post(change_password::<C, S>))
        .with_state(service)
}

async fn create_session<C, S>(
    State(service): State<Service<C, S>>,
    Json(req): Json<CreateSessionRequest>,
) -> (StatusCode, Json<CreateSessionResponse>)
where
    C: CredentialStore + 'static,
    S: SessionStore + 'static,
{
    let (status, session_id) = match service.create_session(req.user_id, &req.password).await {
        Ok(session_id) => (RpcStatus::Ok, Some(session_id)),
        Err(err) => (status_of("CreateSession", &err), None),
    };
    (http_status(status), Json(CreateSessionResponse { status, session_id }))
}

async fn check_session<C, S>(
    State(service): State<Service<C, S>>,
    Json(req): Json<CheckSessionRequest>,
) -> (StatusCode, Json<CheckSessionResponse>)
where
    C: CredentialStore + 'static,
    S: SessionStore + 'static,
{
    let (status, user_id) = match service.check_session(&req.session_id).await {
        Ok(user_id) => (RpcStatus::Ok, Some(user_id)),
        Err(err) => (status_of("CheckSession", &err), None),
    };
    (http_status(status), Json(CheckSessionResponse { status, user_id }))
}

async fn delete_session<C, S>(
    State(service): State<Service<C, S>>,
    Json(req): Json<DeleteSessionRequest>,
) -> (StatusCode, Json<StatusResponse>)
where
    C: CredentialStore + 'static,
    S: SessionStore + 'static,
{
    let status = match service.delete_session(&req.session_id).await {
        Ok(()) => RpcStatus::Ok,
        Err(err) => status_of("DeleteSession", &err),
    };
    (http_status(status), Json(StatusResponse::new(status)))
}

async fn change_password<C, S>(
    State(service): State<Service<C, S>>,
    Json(req): Json<ChangePasswordRequest>,
) -> (StatusCode, Json<StatusResponse>)
where
    C: CredentialStore + 'static,
    S: SessionStore + 'static,
{
    let status = match service
        .change_password(&req.session_id, &req.old_password, &req.new_password)
        .await
    {
        Ok(()) => RpcStatus::Ok,
        Err(err) => status_of("ChangePassword", &err),
    };
    (http_status(status), Json(StatusResponse::new(status)))
}

/// Maps a service error onto the protocol status
fn status_of(operation: &str, err: &CoreError) -> RpcStatus {
    match err {
        CoreError::WrongCredentials | CoreError::NotFound(_) => RpcStatus::InvalidCredentials,
        CoreError::Validation(_) => RpcStatus::InvalidArgument,
        _ => {
            tracing::error!(operation, error = %err, "Auth operation failed");
            RpcStatus::InternalError
        }
    }
}

fn http_status(status: RpcStatus) -> StatusCode {
    match status {
        RpcStatus::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    }
}
