use std::sync::Arc;

use crate::coaching::service::CoachingService;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator with its LLM client, prompt composer and scorer. Built once in `main`.
    pub coach: Arc<CoachingService>,
    pub config: Config,
}
