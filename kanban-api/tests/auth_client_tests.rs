//! AuthClient against an in-process auth service

mod common;

use kanban_api::auth_client::{AuthClient, AuthClientError};
use kanban_auth::credentials::MemoryCredentialStore;
use kanban_shared::ids::UserId;

const PASSWORD: &str = "correct1horse";

async fn client() -> AuthClient {
    let credentials = MemoryCredentialStore::new();
    credentials.add_user(UserId::new(1), PASSWORD).await.unwrap();
    AuthClient::new(common::spawn_auth(credentials).await).unwrap()
}

#[tokio::test]
async fn test_session_roundtrip() {
    let auth = client().await;

    let session = auth.create_session(UserId::new(1), PASSWORD).await.unwrap();
    assert_eq!(auth.check_session(&session).await.unwrap(), UserId::new(1));

    auth.delete_session(&session).await.unwrap();
    assert!(matches!(
        auth.check_session(&session).await,
        Err(AuthClientError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_wrong_password() {
    let auth = client().await;

    let result = auth.create_session(UserId::new(1), "wrong1pass").await;
    assert!(matches!(result, Err(AuthClientError::InvalidCredentials)));
}

#[tokio::test]
async fn test_change_password_statuses() {
    let auth = client().await;
    let current = auth.create_session(UserId::new(1), PASSWORD).await.unwrap();
    let other = auth.create_session(UserId::new(1), PASSWORD).await.unwrap();

    let weak = auth.change_password(&current, PASSWORD, "short").await;
    assert!(matches!(weak, Err(AuthClientError::InvalidArgument)));

    auth.change_password(&current, PASSWORD, "battery9staple")
        .await
        .unwrap();

    assert!(auth.check_session(&current).await.is_ok());
    assert!(matches!(
        auth.check_session(&other).await,
        Err(AuthClientError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_unreachable_service() {
    let auth = AuthClient::new("http://127.0.0.1:1").unwrap();

    assert!(matches!(
        auth.check_session("anything").await,
        Err(AuthClientError::Transport(_))
    ));
    assert!(!auth.is_reachable().await);
}
