/// Client for the auth service
///
/// Thin JSON client over the four protocol operations. Expected outcomes come
/// back as [`RpcStatus`] values and are turned into [`AuthClientError`]s here,
/// so handlers only ever see `Ok` or a typed failure.
///
/// # Example
///
/// ```no_run
/// use kanban_api::auth_client::AuthClient;
/// use kanban_shared::ids::UserId;
///
/// # async fn example() -> Result<(), kanban_api::auth_client::AuthClientError> {
/// let auth = AuthClient::new("http://localhost:8081")?;
/// let session_id = auth.create_session(UserId::new(1), "correct1horse").await?;
/// assert_eq!(auth.check_session(&session_id).await?, UserId::new(1));
/// # Ok(())
/// # }
/// ```

use kanban_shared::auth::protocol::{
    ChangePasswordRequest, CheckSessionRequest, CheckSessionResponse, CreateSessionRequest,
    CreateSessionResponse, DeleteSessionRequest, RpcStatus, StatusResponse, CHANGE_PASSWORD_PATH,
    CHECK_SESSION_PATH, CREATE_SESSION_PATH, DELETE_SESSION_PATH,
};
use kanban_shared::ids::UserId;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use crate::error::ApiError;

/// Requests to the auth service give up after this long
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum AuthClientError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid argument")]
    InvalidArgument,

    #[error("Auth service reported an internal error")]
    Internal,

    #[error("Auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed auth response: {0}")]
    MalformedResponse(String),
}

impl From<AuthClientError> for ApiError {
    fn from(err: AuthClientError) -> Self {
        match err {
            AuthClientError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthClientError::InvalidArgument => ApiError::invalid_field(
                "new_password",
                "Password does not meet the strength requirements",
            ),
            AuthClientError::Internal => {
                ApiError::InternalError("Auth service reported an internal error".to_string())
            }
            AuthClientError::Transport(e) => ApiError::ServiceUnavailable(e.to_string()),
            AuthClientError::MalformedResponse(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Cloneable handle to the auth service
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Logs `user_id` in and returns the new session id
    pub async fn create_session(
        &self,
        user_id: UserId,
        password: &str,
    ) -> Result<String, AuthClientError> {
        let response: CreateSessionResponse = self
            .call(
                CREATE_SESSION_PATH,
                &CreateSessionRequest {
                    user_id,
                    password: password.to_string(),
                },
            )
            .await?;

        check_status(response.status)?;
        response
            .session_id
            .ok_or_else(|| AuthClientError::MalformedResponse("missing session_id".to_string()))
    }

    /// Owner of a live session
    pub async fn check_session(&self, session_id: &str) -> Result<UserId, AuthClientError> {
        let response: CheckSessionResponse = self
            .call(
                CHECK_SESSION_PATH,
                &CheckSessionRequest {
                    session_id: session_id.to_string(),
                },
            )
            .await?;

        check_status(response.status)?;
        response
            .user_id
            .ok_or_else(|| AuthClientError::MalformedResponse("missing user_id".to_string()))
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<(), AuthClientError> {
        let response: StatusResponse = self
            .call(
                DELETE_SESSION_PATH,
                &DeleteSessionRequest {
                    session_id: session_id.to_string(),
                },
            )
            .await?;

        check_status(response.status)
    }

    /// Changes the password; the service ends every other session of the user
    pub async fn change_password(
        &self,
        session_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthClientError> {
        let response: StatusResponse = self
            .call(
                CHANGE_PASSWORD_PATH,
                &ChangePasswordRequest {
                    old_password: old_password.to_string(),
                    new_password: new_password.to_string(),
                    session_id: session_id.to_string(),
                },
            )
            .await?;

        check_status(response.status)
    }

    /// Whether the auth service answers its health check
    pub async fn is_reachable(&self) -> bool {
        match self.http.get(format!("{}/health", self.base_url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "Auth service health check failed");
                false
            }
        }
    }

    /// Posts `body` and decodes the reply, whatever its HTTP status
    ///
    /// `internal_error` replies arrive as 500s that still carry a status body.
    async fn call<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, AuthClientError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(path, http_status = %status, error = %e, "Undecodable auth response");
            AuthClientError::MalformedResponse(format!("{} returned {}: {}", path, status, e))
        })
    }
}

fn check_status(status: RpcStatus) -> Result<(), AuthClientError> {
    match status {
        RpcStatus::Ok => Ok(()),
        RpcStatus::InvalidCredentials => Err(AuthClientError::InvalidCredentials),
        RpcStatus::InvalidArgument => Err(AuthClientError::InvalidArgument),
        RpcStatus::InternalError => Err(AuthClientError::Internal),
    }
}
