/// Password storage seen by the auth service
///
/// The service only needs two things from the user table: read a user's
/// password hash and replace it. Keeping that behind [`CredentialStore`] lets
/// the protocol be exercised end to end without PostgreSQL.
///
/// # Implementations
///
/// - [`PgCredentialStore`]: the `users` table
/// - [`MemoryCredentialStore`]: process-local map for tests and demos

mod memory;
mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

use async_trait::async_trait;
use kanban_shared::error::CoreResult;
use kanban_shared::ids::UserId;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stored Argon2id hash, `None` for unknown users
    async fn password_hash(&self, user_id: UserId) -> CoreResult<Option<String>>;

    /// Replaces the hash; returns false for unknown users
    async fn set_password_hash(&self, user_id: UserId, hash: &str) -> CoreResult<bool>;
}
