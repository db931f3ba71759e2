/// PostgreSQL access for the board store
///
/// - `pool`: connection pool construction and health checks
/// - `migrations`: embedded schema migrations
///
/// Row-level operations live in [`crate::models`]; order-changing writes in
/// [`crate::ordering::store`].
///
/// # Example
///
/// ```no_run
/// use kanban_shared::db::migrations::run_migrations;
/// use kanban_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
