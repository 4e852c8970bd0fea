//! Liveness and readiness probe.

use std::time::Duration;

use axum::{extract::Extension, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::error;

use crate::server::app::AppState;

/// Reports service health, including database connectivity.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<Value>) {
    let db_check = tokio::time::timeout(
        Duration::from_secs(5),
        sqlx::query("SELECT 1").execute(&state.db_pool),
    )
    .await;

    match db_check {
        Ok(Ok(_)) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "enhancement": if state.openai_client.is_some() { "configured" } else { "disabled" },
            })),
        ),
        Ok(Err(e)) => {
            error!(error = %e, "health check database query failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "error",
                })),
            )
        }
        Err(_) => {
            error!("health check database query timed out");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "timeout",
                })),
            )
        }
    }
}
