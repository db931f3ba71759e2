//! # Kanban API Server
//!
//! Boards, columns, cards and their content over HTTP. Sessions are
//! checked against the auth service on every authenticated request.
//!
//! ```bash
//! cargo run -p kanban-api
//! ```

use kanban_api::{
    app::{build_router, AppState},
    auth_client::AuthClient,
    config::Config,
};
use kanban_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kanban_api=debug,kanban_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Kanban API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(config.database.clone()).await?;
    run_migrations(&pool).await?;

    let auth = AuthClient::new(config.auth_service_url.clone())?;
    if !auth.is_reachable().await {
        tracing::warn!(url = %config.auth_service_url, "Auth service not reachable yet");
    }

    let addr = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config, auth));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received, exiting...");
}
