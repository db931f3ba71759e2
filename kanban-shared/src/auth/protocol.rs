/// Wire types of the authentication protocol
///
/// The auth service answers four JSON calls, each `POST /rpc/<Operation>`.
/// Expected failures travel in the body as an [`RpcStatus`]; a non-2xx HTTP
/// status only ever means something unexpected went wrong.
///
/// | Operation        | Request                                         | Statuses                                        |
/// |------------------|-------------------------------------------------|-------------------------------------------------|
/// | `CreateSession`  | `user_id`, `password`                           | ok, invalid_credentials, internal_error         |
/// | `CheckSession`   | `session_id`                                    | ok, invalid_credentials                         |
/// | `DeleteSession`  | `session_id`                                    | ok, internal_error                              |
/// | `ChangePassword` | `old_password`, `new_password`, `session_id`    | ok, invalid_credentials, invalid_argument, internal_error |

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

pub const CREATE_SESSION_PATH: &str = "/rpc/CreateSession";
pub const CHECK_SESSION_PATH: &str = "/rpc/CheckSession";
pub const DELETE_SESSION_PATH: &str = "/rpc/DeleteSession";
pub const CHANGE_PASSWORD_PATH: &str = "/rpc/ChangePassword";

/// Outcome carried in every response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcStatus {
    Ok,
    InvalidCredentials,
    InvalidArgument,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: UserId,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub status: RpcStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSessionRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSessionResponse {
    pub status: RpcStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSessionRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub session_id: String,
}

/// Response of the calls that return nothing but a status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: RpcStatus,
}

impl StatusResponse {
    pub fn new(status: RpcStatus) -> Self {
        Self { status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&RpcStatus::Ok).unwrap(), "\"ok\"");
        assert_eq!(
            serde_json::to_string(&RpcStatus::InvalidCredentials).unwrap(),
            "\"invalid_credentials\""
        );
    }

    #[test]
    fn test_optional_fields_omitted() {
        let response = CheckSessionResponse {
            status: RpcStatus::InvalidCredentials,
            user_id: None,
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"status":"invalid_credentials"}"#
        );

        let parsed: CheckSessionResponse =
            serde_json::from_str(r#"{"status":"ok","user_id":"user_5"}"#).unwrap();
        assert_eq!(parsed.user_id, Some(UserId::new(5)));
    }
}
