//! Axum route handlers for the AEO API.
//!
//! Every handler answers with an `Envelope`; malformed bodies are reported
//! as validation failures through the same envelope.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::aeo::analysis::{analyze_content, AnalysisRequest, AnalysisResult};
use crate::aeo::concise::{generate_concise_answer, ConciseAnswer, ConciseAnswerRequest};
use crate::aeo::rewrite::{rewrite_content, RewriteRequest, RewriteResult};
use crate::aeo::schema_markup::{build_schema_markup, SchemaMarkupRequest};
use crate::aeo::score::{predict_score, AeoScore, ScoreRequest};
use crate::errors::{Envelope, TaskError};
use crate::state::AppState;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, TaskError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| TaskError::Validation(format!("Invalid request body: {}", rejection.body_text())))
}

/// POST /api/v1/analysis
///
/// Score + concise answer + competitor snapshot for one query/content pair.
pub async fn handle_analysis(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Envelope<AnalysisResult> {
    let result = match body(payload) {
        Ok(request) => analyze_content(&request, &state.invoker, &state.competitors).await,
        Err(err) => Err(err),
    };
    result.into()
}

/// POST /api/v1/rewrites
pub async fn handle_rewrite(
    State(state): State<AppState>,
    payload: Result<Json<RewriteRequest>, JsonRejection>,
) -> Envelope<RewriteResult> {
    let result = match body(payload) {
        Ok(request) => rewrite_content(&request, &state.invoker).await,
        Err(err) => Err(err),
    };
    result.into()
}

/// POST /api/v1/score
pub async fn handle_score(
    State(state): State<AppState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Envelope<AeoScore> {
    let result = match body(payload) {
        Ok(request) => predict_score(&request, &state.invoker).await,
        Err(err) => Err(err),
    };
    result.into()
}

/// POST /api/v1/concise-answer
pub async fn handle_concise_answer(
    State(state): State<AppState>,
    payload: Result<Json<ConciseAnswerRequest>, JsonRejection>,
) -> Envelope<ConciseAnswer> {
    let result = match body(payload) {
        Ok(request) => generate_concise_answer(&request, &state.invoker).await,
        Err(err) => Err(err),
    };
    result.into()
}

/// POST /api/v1/schema-markup
///
/// Pure transformation; does not touch the LLM.
pub async fn handle_schema_markup(
    payload: Result<Json<SchemaMarkupRequest>, JsonRejection>,
) -> Envelope<Value> {
    body(payload)
        .and_then(|request| build_schema_markup(&request, Utc::now().date_naive()))
        .into()
}
