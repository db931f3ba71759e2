use async_trait::async_trait;
use kanban_shared::auth::password::{hash_password, PasswordError};
use kanban_shared::error::CoreResult;
use kanban_shared::ids::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::CredentialStore;

/// In-memory credentials
///
/// # Example
///
/// ```
/// use kanban_auth::credentials::{CredentialStore, MemoryCredentialStore};
/// use kanban_shared::ids::UserId;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryCredentialStore::new();
/// store.add_user(UserId::new(1), "hunter22x").await.unwrap();
/// assert!(store.password_hash(UserId::new(1)).await.unwrap().is_some());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    hashes: Arc<RwLock<HashMap<UserId, String>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user with a plaintext password
    pub async fn add_user(&self, user_id: UserId, password: &str) -> Result<(), PasswordError> {
        let hash = hash_password(password)?;
        self.hashes.write().await.insert(user_id, hash);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn password_hash(&self, user_id: UserId) -> CoreResult<Option<String>> {
        Ok(self.hashes.read().await.get(&user_id).cloned())
    }

    async fn set_password_hash(&self, user_id: UserId, hash: &str) -> CoreResult<bool> {
        let mut hashes = self.hashes.write().await;
        match hashes.get_mut(&user_id) {
            Some(stored) => {
                *stored = hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
