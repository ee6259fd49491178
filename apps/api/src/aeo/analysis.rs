//! Full content analysis: score, concise answer and competitor snapshot,
//! fanned out concurrently and joined.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aeo::concise::{generate_concise_answer, ConciseAnswer, ConciseAnswerRequest};
use crate::aeo::invoker::{require_text, PromptInvoker};
use crate::aeo::score::{predict_score, AeoScore, ScoreRequest};
use crate::competitors::{CompetitorFetcher, CompetitorResult};
use crate::errors::TaskError;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub query: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub aeo_score: AeoScore,
    pub concise_answer: ConciseAnswer,
    pub competitors: Vec<CompetitorResult>,
}

/// Runs the score and concise-answer tasks alongside the competitor fetch.
/// Either LLM task failing fails the analysis; the competitor fetch cannot fail.
pub async fn analyze_content(
    request: &AnalysisRequest,
    invoker: &PromptInvoker,
    competitors: &CompetitorFetcher,
) -> Result<AnalysisResult, TaskError> {
    require_text("query", &request.query)?;
    require_text("content", &request.content)?;

    let score_request = ScoreRequest {
        query: request.query.clone(),
        text: request.content.clone(),
    };
    let answer_request =
        ConciseAnswerRequest::with_defaults(request.query.clone(), request.content.clone());

    let (generated, competitors) = tokio::join!(
        async {
            tokio::try_join!(
                predict_score(&score_request, invoker),
                generate_concise_answer(&answer_request, invoker),
            )
        },
        competitors.fetch(&request.query),
    );
    let (aeo_score, concise_answer) = generated?;

    info!(
        "Analysis complete: aeo_score={}, competitors={}",
        aeo_score.aeo_score,
        competitors.len()
    );

    Ok(AnalysisResult {
        aeo_score,
        concise_answer,
        competitors,
    })
}
