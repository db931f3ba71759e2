use async_trait::async_trait;
use kanban_shared::error::CoreResult;
use kanban_shared::ids::UserId;
use kanban_shared::models::user::User;
use sqlx::PgPool;

use super::CredentialStore;

/// Credentials read from and written to the `users` table
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn password_hash(&self, user_id: UserId) -> CoreResult<Option<String>> {
        Ok(User::find_by_id(&self.pool, user_id)
            .await?
            .map(|user| user.password_hash))
    }

    async fn set_password_hash(&self, user_id: UserId, hash: &str) -> CoreResult<bool> {
        Ok(User::update_password_hash(&self.pool, user_id, hash).await?)
    }
}
