use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::SessionStore;
use crate::error::CoreResult;
use crate::ids::UserId;

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<String, (UserId, Instant)>,
    by_user: HashMap<UserId, HashSet<String>>,
}

impl Inner {
    /// Drops every expired session from both maps
    fn evict_expired(&mut self, now: Instant) {
        let sessions = &mut self.sessions;
        self.by_user.retain(|_, keys| {
            keys.retain(|key| {
                let live = matches!(sessions.get(key), Some((_, expires_at)) if now < *expires_at);
                if !live {
                    sessions.remove(key);
                }
                live
            });
            !keys.is_empty()
        });
        sessions.retain(|_, (_, expires_at)| now < *expires_at);
    }
}

/// Process-local session store for tests and single-node development
///
/// Expired entries read as absent and are evicted on the next write or
/// `sessions_of`.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, key: &str, user_id: UserId, ttl: Duration) -> CoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.evict_expired(Instant::now());
        inner
            .sessions
            .insert(key.to_string(), (user_id, Instant::now() + ttl));
        inner
            .by_user
            .entry(user_id)
            .or_default()
            .insert(key.to_string());
        Ok(())
    }

    async fn lookup(&self, key: &str) -> CoreResult<Option<UserId>> {
        let inner = self.inner.read().await;
        Ok(inner
            .sessions
            .get(key)
            .filter(|(_, expires_at)| Instant::now() < *expires_at)
            .map(|(user_id, _)| *user_id))
    }

    async fn remove(&self, key: &str, owner: UserId) -> CoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.sessions.remove(key);
        if let Some(keys) = inner.by_user.get_mut(&owner) {
            keys.remove(key);
            if keys.is_empty() {
                inner.by_user.remove(&owner);
            }
        }
        Ok(())
    }

    async fn sessions_of(&self, user_id: UserId) -> CoreResult<Vec<String>> {
        let mut inner = self.inner.write().await;
        inner.evict_expired(Instant::now());
        Ok(inner
            .by_user
            .get(&user_id)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default())
    }
}
