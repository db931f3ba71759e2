/// Session issuing and checking
///
/// # Example
///
/// ```
/// use kanban_shared::ids::UserId;
/// use kanban_shared::session::{MemorySessionStore, SessionRegistry};
///
/// # #[tokio::main]
/// # async fn main() {
/// let registry = SessionRegistry::new(MemorySessionStore::new());
/// let user = UserId::new(9);
///
/// let token = registry.create(user).await.unwrap();
/// assert_eq!(registry.check(&token).await.unwrap(), user);
///
/// registry.kill(&token).await.unwrap();
/// assert!(registry.check(&token).await.is_err());
/// # }
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};
use std::time::Duration;

use super::SessionStore;
use crate::error::{CoreError, CoreResult};
use crate::ids::UserId;

/// Sessions live for seven days
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Length of a session token in characters
pub const TOKEN_LENGTH: usize = 32;

/// Issues, checks and revokes session tokens
#[derive(Debug, Clone)]
pub struct SessionRegistry<S> {
    store: S,
    ttl: Duration,
}

impl<S: SessionStore> SessionRegistry<S> {
    /// Registry with the default seven-day TTL
    pub fn new(store: S) -> Self {
        Self::with_ttl(store, DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Starts a session for `user_id` and returns its token
    pub async fn create(&self, user_id: UserId) -> CoreResult<String> {
        let token = generate_token();
        self.store
            .insert(&session_key(&token), user_id, self.ttl)
            .await?;

        tracing::debug!(user_id = %user_id, ttl_secs = self.ttl.as_secs(), "Session created");
        Ok(token)
    }

    /// Returns the user owning `token`
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown and expired tokens alike.
    pub async fn check(&self, token: &str) -> CoreResult<UserId> {
        self.store
            .lookup(&session_key(token))
            .await?
            .ok_or_else(|| CoreError::not_found("session"))
    }

    /// Ends the session behind `token`; unknown tokens are ignored
    pub async fn kill(&self, token: &str) -> CoreResult<()> {
        let key = session_key(token);
        if let Some(owner) = self.store.lookup(&key).await? {
            self.store.remove(&key, owner).await?;
            tracing::debug!(user_id = %owner, "Session killed");
        }
        Ok(())
    }

    /// Ends every session of `user_id` except the one behind `keep`
    ///
    /// Returns how many sessions were removed from the user's set.
    pub async fn displace(&self, keep: &str, user_id: UserId) -> CoreResult<usize> {
        let keep_key = session_key(keep);
        let mut removed = 0;

        for key in self.store.sessions_of(user_id).await? {
            if key == keep_key {
                continue;
            }
            self.store.remove(&key, user_id).await?;
            removed += 1;
        }

        tracing::info!(user_id = %user_id, removed, "Displaced other sessions");
        Ok(removed)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Generates a random alphanumeric session token
pub fn generate_token() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hex SHA-256 of a token, the only form stores ever see
pub fn session_key(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
