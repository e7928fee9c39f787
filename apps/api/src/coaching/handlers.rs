//! Axum route handlers for the Coaching API.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::coaching::models::{CoachingSession, ResumeInput};
use crate::coaching::service::GenerationMode;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionQuery {
    /// Overrides `QUALITY_OPTIMIZATION` for this request.
    pub optimize: Option<bool>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/coaching-sessions
///
/// Validates the résumé and generates a session: best-of-nine when
/// optimization is on, single pass otherwise. Unreadable bodies are
/// validation errors too.
pub async fn handle_create_session(
    State(state): State<AppState>,
    Query(query): Query<CreateSessionQuery>,
    body: Result<Json<ResumeInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CoachingSession>), AppError> {
    let Json(resume) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    resume.validate().map_err(AppError::Validation)?;

    let optimize = query.optimize.unwrap_or(state.config.quality_optimization);
    let session = state
        .coach
        .create_session(&resume, GenerationMode::from_optimize_flag(optimize))
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/coaching-sessions/health
///
/// Probes the oracle. 503 when it does not answer the health prompt.
pub async fn handle_coaching_health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.coach.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "healthy" })))
    } else {
        warn!("Coaching health check failed: oracle unavailable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unhealthy" })),
        )
    }
}
