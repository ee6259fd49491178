use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, and which integrations are configured.
/// A missing credential is reported as "degraded", never as an outage.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let llm = state.invoker.is_configured();
    let search = state.competitors.is_configured();
    let status = if llm && search { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "service": "answerfirst-api",
        "integrations": {
            "llm": llm,
            "llmModel": state.config.llm_model,
            "search": search
        }
    }))
}
