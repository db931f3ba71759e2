use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;

use super::SessionStore;
use crate::error::CoreResult;
use crate::ids::UserId;
use crate::redis::RedisClient;

/// Redis key of the direct mapping
fn session_entry(key: &str) -> String {
    format!("session:{}", key)
}

/// Redis key of a user's session set
fn user_sessions(user_id: UserId) -> String {
    format!("user_sessions:{}", user_id.get())
}

/// Session store backed by Redis
///
/// # Key layout
///
/// ```text
/// session:{sha256(token)}    STRING  user id, SETEX with the session TTL
/// user_sessions:{user_id}    SET     sha256(token) of each session
/// ```
///
/// Each insert pushes the set's expiry out to the new session's TTL, so the
/// set disappears with the last session. Members whose session expired
/// earlier are pruned by [`SessionStore::sessions_of`].
#[derive(Clone)]
pub struct RedisSessionStore {
    client: RedisClient,
}

impl RedisSessionStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn insert(&self, key: &str, user_id: UserId, ttl: Duration) -> CoreResult<()> {
        let entry = session_entry(key);
        let set = user_sessions(user_id);
        let member = key.to_string();
        // SETEX rejects a zero TTL
        let secs = ttl.as_secs().max(1);

        self.client
            .run(|mut conn| async move {
                redis::pipe()
                    .atomic()
                    .set_ex(&entry, user_id.get(), secs)
                    .ignore()
                    .sadd(&set, &member)
                    .ignore()
                    .cmd("EXPIRE")
                    .arg(&set)
                    .arg(secs)
                    .ignore()
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
            .await?;
        Ok(())
    }

    async fn lookup(&self, key: &str) -> CoreResult<Option<UserId>> {
        let entry = session_entry(key);
        let raw: Option<i64> = self
            .client
            .run(|mut conn| async move { conn.get(&entry).await })
            .await?;
        Ok(raw.map(UserId::new))
    }

    async fn remove(&self, key: &str, owner: UserId) -> CoreResult<()> {
        let entry = session_entry(key);
        let set = user_sessions(owner);
        let member = key.to_string();

        self.client
            .run(|mut conn| async move {
                redis::pipe()
                    .del(&entry)
                    .ignore()
                    .srem(&set, &member)
                    .ignore()
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
            .await?;
        Ok(())
    }

    async fn sessions_of(&self, user_id: UserId) -> CoreResult<Vec<String>> {
        let set = user_sessions(user_id);
        let members: Vec<String> = {
            let set = set.clone();
            self.client
                .run(|mut conn| async move { conn.smembers(&set).await })
                .await?
        };
        if members.is_empty() {
            return Ok(members);
        }

        let entries: Vec<String> = members.iter().map(|key| session_entry(key)).collect();
        let owners: Vec<Option<i64>> = self
            .client
            .run(|mut conn| async move { redis::cmd("MGET").arg(&entries).query_async(&mut conn).await })
            .await?;

        let (live, dead): (Vec<_>, Vec<_>) = members
            .into_iter()
            .zip(owners)
            .partition(|(_, owner)| owner.is_some());
        let dead: Vec<String> = dead.into_iter().map(|(key, _)| key).collect();

        if !dead.is_empty() {
            tracing::debug!(user_id = %user_id, pruned = dead.len(), "Pruned expired sessions");
            self.client
                .run(|mut conn| async move { conn.srem::<_, _, ()>(&set, &dead).await })
                .await?;
        }

        Ok(live.into_iter().map(|(key, _)| key).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redis::RedisConfig;

    #[test]
    fn test_key_layout() {
        assert_eq!(session_entry("abc"), "session:abc");
        assert_eq!(user_sessions(UserId::new(42)), "user_sessions:42");
    }

    #[tokio::test]
    #[ignore] // Requires running Redis instance
    async fn test_redis_roundtrip() {
        let client = RedisClient::new(RedisConfig::local()).await.unwrap();
        let store = RedisSessionStore::new(client);
        let user = UserId::new(900_001);
        let key = crate::session::session_key(&crate::session::generate_token());

        store.insert(&key, user, Duration::from_secs(30)).await.unwrap();
        assert_eq!(store.lookup(&key).await.unwrap(), Some(user));
        assert!(store.sessions_of(user).await.unwrap().contains(&key));

        store.remove(&key, user).await.unwrap();
        assert_eq!(store.lookup(&key).await.unwrap(), None);
        assert!(!store.sessions_of(user).await.unwrap().contains(&key));
    }

    #[tokio::test]
    #[ignore] // Requires running Redis instance
    async fn test_user_set_expires_and_prunes() {
        let client = RedisClient::new(RedisConfig::local()).await.unwrap();
        let store = RedisSessionStore::new(client.clone());
        let user = UserId::new(900_002);
        let short = crate::session::session_key(&crate::session::generate_token());
        let long = crate::session::session_key(&crate::session::generate_token());

        store.insert(&short, user, Duration::from_secs(1)).await.unwrap();
        store.insert(&long, user, Duration::from_secs(30)).await.unwrap();

        let set = user_sessions(user);
        let ttl: i64 = client
            .run(|mut conn| async move { conn.ttl(&set).await })
            .await
            .unwrap();
        assert!(ttl > 1 && ttl <= 30);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(store.sessions_of(user).await.unwrap(), vec![long.clone()]);

        store.remove(&long, user).await.unwrap();
    }
}
