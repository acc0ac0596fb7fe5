//! Health API

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use shared::ApiResponse;

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

async fn health(
    axum::extract::State(state): axum::extract::State<ServerState>,
) -> AppResult<Json<ApiResponse<Value>>> {
    // A trivial query proves the pool is alive.
    let ok: i64 = sqlx::query_scalar("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(|e| crate::utils::AppError::Database(e.to_string()))?;

    Ok(crate::utils::ok(json!({
        "status": "ok",
        "database": ok == 1,
        "environment": state.config.environment,
    })))
}
