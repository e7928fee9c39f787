mod coaching;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::coaching::prompts::PromptComposer;
use crate::coaching::quality::{HeuristicScorer, Rubric};
use crate::coaching::service::{CoachingService, ServiceSettings};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparseable env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (fails without OPENAI_API_KEY)
    let llm = LlmClient::from_config(&config)?;
    info!(
        "LLM client initialized (model: {}, base url: {}, max attempts: {})",
        config.llm_model,
        config.openai_base_url,
        llm.retry_policy().max_attempts
    );

    // Initialize scorer (HeuristicScorer over the shipped rubric)
    let scorer = Arc::new(HeuristicScorer::new(Rubric::default()));

    let coach = CoachingService::new(
        llm,
        PromptComposer::new(),
        scorer,
        ServiceSettings::from_config(&config),
    );
    info!(
        "Coaching service initialized (quality optimization: {}, deadline: {}s)",
        config.quality_optimization, config.request_deadline_secs
    );

    // Build app state
    let state = AppState {
        coach: Arc::new(coach),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
