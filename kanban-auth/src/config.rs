/// Configuration for the auth service
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `REDIS_URL`: Session store (required)
/// - `AUTH_HOST`: Host to bind to (default: 0.0.0.0)
/// - `AUTH_PORT`: Port to bind to (default: 8081)
/// - `SESSION_TTL_SECS`: Session lifetime (default: 604800, seven days)

use kanban_shared::db::pool::DatabaseConfig;
use kanban_shared::redis::RedisConfig;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub session_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a number does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("AUTH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("AUTH_PORT")
            .unwrap_or_else(|_| "8081".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let redis = RedisConfig::from_env()?;

        let ttl_secs = env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse::<u64>()?;
        if ttl_secs == 0 {
            anyhow::bail!("SESSION_TTL_SECS must be positive");
        }

        Ok(Self {
            host,
            port,
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                ..DatabaseConfig::default()
            },
            redis,
            session_ttl: Duration::from_secs(ttl_secs),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
