/// Redis integration for the session store
///
/// The authentication service keeps sessions in Redis:
///
/// ```text
/// CreateSession ──SETEX──> session:{sha256(token)}  (user id, TTL 7d)
///               ──SADD───> user_sessions:{user_id}  (advisory reverse set)
///
/// CheckSession  ──GET────> session:{sha256(token)}
/// ```
///
/// # Example
///
/// ```no_run
/// use kanban_shared::redis::client::{RedisClient, RedisConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RedisConfig::from_env()?;
/// let client = RedisClient::new(config).await?;
///
/// let healthy = client.ping().await?;
/// println!("Redis healthy: {}", healthy);
/// # Ok(())
/// # }
/// ```

pub mod client;

pub use client::{RedisClient, RedisClientError, RedisConfig};
