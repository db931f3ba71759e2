//! # Kanban Auth Service
//!
//! ```bash
//! cargo run -p kanban-auth
//! ```

use std::sync::Arc;

use kanban_auth::config::Config;
use kanban_auth::credentials::PgCredentialStore;
use kanban_auth::health::{self, HealthState};
use kanban_auth::rpc;
use kanban_auth::service::AuthService;
use kanban_shared::db::migrations::run_migrations;
use kanban_shared::db::pool::{close_pool, create_pool};
use kanban_shared::redis::RedisClient;
use kanban_shared::session::{RedisSessionStore, SessionRegistry};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kanban_auth=debug,kanban_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Kanban auth v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(config.database.clone()).await?;
    run_migrations(&pool).await?;

    let redis = RedisClient::new(config.redis.clone()).await?;

    let sessions = SessionRegistry::with_ttl(RedisSessionStore::new(redis.clone()), config.session_ttl);
    let service = Arc::new(AuthService::new(PgCredentialStore::new(pool.clone()), sessions));

    let app = rpc::router(service)
        .merge(health::router(HealthState {
            db: pool.clone(),
            redis,
        }))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Auth service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Auth service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
