//! Login sessions
//!
//! A session is an opaque token mapped to a user id with a fixed lifetime.
//! The [`SessionRegistry`] issues and checks tokens on top of a
//! [`SessionStore`], which keeps two mappings:
//!
//! - direct: `session key → user id`, expiring after the TTL
//! - reverse: `user id → {session keys}`, used only to find a user's other
//!   sessions when they change their password
//!
//! The two mappings are not updated atomically with each other. The reverse
//! set is advisory: stores prune expired keys from it lazily, and
//! [`SessionRegistry::check`] never reads it.
//!
//! Tokens are never stored as-is. Stores only see the SHA-256 of a token
//! (its *session key*), so a dump of the store cannot be replayed as cookies.

mod memory;
mod redis_store;
mod registry;

pub use memory::MemorySessionStore;
pub use redis_store::RedisSessionStore;
pub use registry::{generate_token, session_key, SessionRegistry, DEFAULT_SESSION_TTL, TOKEN_LENGTH};

use async_trait::async_trait;
use std::time::Duration;

use crate::error::CoreResult;
use crate::ids::UserId;

/// Storage primitives behind [`SessionRegistry`]
///
/// All methods take session keys (hashed tokens), never raw tokens.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores `key → user_id` for `ttl` and adds `key` to the user's set
    ///
    /// The set itself must not outlive the newest session in it.
    async fn insert(&self, key: &str, user_id: UserId, ttl: Duration) -> CoreResult<()>;

    /// Owner of a live session; expired and unknown keys are both `None`
    async fn lookup(&self, key: &str) -> CoreResult<Option<UserId>>;

    /// Drops the direct mapping and removes `key` from `owner`'s set
    ///
    /// Absent keys are not an error.
    async fn remove(&self, key: &str, owner: UserId) -> CoreResult<()>;

    /// Keys of the user's live sessions
    ///
    /// Expired keys found in the user's set are pruned on the way.
    async fn sessions_of(&self, user_id: UserId) -> CoreResult<Vec<String>>;
}
