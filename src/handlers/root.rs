// handlers/root.rs - liveness and health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::AppState;

/// GET / - plain liveness text
pub async fn root() -> &'static str {
    "Server is running"
}

/// GET /health - liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "instance": state.instance.as_str(),
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "instance": state.instance.as_str(),
                    "version": env!("CARGO_PKG_VERSION"),
                    "timestamp": now,
                    "database_error": e.to_string()
                })),
            )
        }
    }
}
