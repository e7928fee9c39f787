use axum::Json;
use serde_json::{json, Value};

/// GET /
/// Service banner with version and the main endpoints.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Career Coach API is running!",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "sessions": "/api/v1/coaching-sessions"
    }))
}

/// GET /health
/// Process liveness only; the oracle is probed by /api/v1/coaching-sessions/health.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "coach-api"
    }))
}
