use crate::aeo::PromptInvoker;
use crate::competitors::CompetitorFetcher;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// LLM tasks (rewrite, score, concise answer) with retry applied uniformly.
    pub invoker: PromptInvoker,
    pub competitors: CompetitorFetcher,
    pub config: Config,
}
