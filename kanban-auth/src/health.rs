/// Health check for the auth service
///
/// ```text
/// GET /health → {"status": "healthy", "version": "0.1.0", "database": "connected", "redis": "connected"}
/// ```

use axum::{extract::State, routing::get, Json, Router};
use kanban_shared::db::pool::health_check as database_health;
use kanban_shared::redis::RedisClient;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Clone)]
pub struct HealthState {
    pub db: PgPool,
    pub redis: RedisClient,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub redis: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    let database_ok = database_health(&state.db).await.is_ok();
    let redis_ok = matches!(state.redis.ping().await, Ok(true));

    Json(HealthResponse {
        status: if database_ok && redis_ok { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: connection_label(database_ok),
        redis: connection_label(redis_ok),
    })
}

fn connection_label(ok: bool) -> String {
    if ok { "connected" } else { "disconnected" }.to_string()
}
