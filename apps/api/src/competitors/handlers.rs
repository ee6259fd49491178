//! Axum route handlers for the Competitors API.

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::competitors::CompetitorResult;
use crate::errors::Envelope;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CompetitorQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/v1/competitors?q=...
///
/// Always succeeds; an empty list means no data is available.
pub async fn handle_competitors(
    State(state): State<AppState>,
    Query(params): Query<CompetitorQuery>,
) -> Envelope<Vec<CompetitorResult>> {
    Envelope::Success(state.competitors.fetch(&params.q).await)
}
