mod aeo;
mod competitors;
mod config;
mod errors;
mod llm_client;
mod retry;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::aeo::PromptInvoker;
use crate::competitors::{CompetitorFetcher, SerperBackend};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::retry::RetryPolicy;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values, never on missing keys)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AnswerFirst API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    if config.llm_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; AI tasks will fail with a configuration error");
    }
    let llm = LlmClient::new(config.llm_api_key.clone(), config.llm_model.clone())?;
    info!("LLM client initialized (model: {})", llm.model());

    let retry = RetryPolicy::with_max_retries(config.llm_max_retries);
    let invoker = PromptInvoker::new(Arc::new(llm), retry);

    // Initialize competitor fetcher
    if config.serper_api_key.is_none() {
        warn!("SERPER_API_KEY is not set; competitor results will be empty");
    }
    let competitors = CompetitorFetcher::new(config.serper_api_key.clone(), Arc::new(SerperBackend::new()?));
    info!("Competitor fetcher initialized");

    // Build app state
    let state = AppState {
        invoker,
        competitors,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
