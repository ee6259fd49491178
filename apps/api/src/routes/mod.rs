pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::aeo::handlers as aeo;
use crate::competitors::handlers as competitors;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // AEO API
        .route("/api/v1/analysis", post(aeo::handle_analysis))
        .route("/api/v1/rewrites", post(aeo::handle_rewrite))
        .route("/api/v1/score", post(aeo::handle_score))
        .route("/api/v1/concise-answer", post(aeo::handle_concise_answer))
        .route("/api/v1/schema-markup", post(aeo::handle_schema_markup))
        // Competitors API
        .route("/api/v1/competitors", get(competitors::handle_competitors))
        .with_state(state)
}
