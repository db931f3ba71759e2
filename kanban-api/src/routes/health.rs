/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "auth_service": "connected"
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use kanban_shared::db::pool::health_check as database_health;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` when every dependency answers, `degraded` otherwise
    pub status: String,

    pub version: String,
    pub database: String,
    pub auth_service: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (database, auth_service) = tokio::join!(
        database_health(&state.db),
        state.auth.is_reachable()
    );
    let database_ok = database.is_ok();

    Json(HealthResponse {
        status: if database_ok && auth_service { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: connection_label(database_ok),
        auth_service: connection_label(auth_service),
    })
}

fn connection_label(ok: bool) -> String {
    if ok { "connected" } else { "disconnected" }.to_string()
}
