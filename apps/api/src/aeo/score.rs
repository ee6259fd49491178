//! AEO score prediction: how likely a piece of content is to be picked as
//! the answer for a query, with a five-factor breakdown.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::aeo::invoker::{require_text, PromptInvoker, PromptTask};
use crate::aeo::prompts::SCORE_PROMPT_TEMPLATE;
use crate::errors::TaskError;
use crate::llm_client::prompts::render;

const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub query: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub length_score: f64,
    pub structure_score: f64,
    pub schema_score: f64,
    pub intent_match_score: f64,
    pub readability_score: f64,
}

impl ScoreBreakdown {
    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("lengthScore", self.length_score),
            ("structureScore", self.structure_score),
            ("schemaScore", self.schema_score),
            ("intentMatchScore", self.intent_match_score),
            ("readabilityScore", self.readability_score),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AeoScore {
    pub aeo_score: f64,
    pub breakdown: ScoreBreakdown,
    pub suggestions: Vec<String>,
}

impl AeoScore {
    /// Every score, overall first, must be a finite number in [0, 100].
    pub fn validate(&self) -> Result<(), String> {
        std::iter::once(("aeoScore", self.aeo_score))
            .chain(self.breakdown.named())
            .try_for_each(|(name, value)| {
                if value.is_finite() && (SCORE_MIN..=SCORE_MAX).contains(&value) {
                    Ok(())
                } else {
                    Err(format!("{name} out of range: {value}"))
                }
            })
    }
}

pub struct ScoreTask;

fn score_property(description: &str) -> Value {
    json!({"type": "NUMBER", "description": description, "minimum": SCORE_MIN, "maximum": SCORE_MAX})
}

impl PromptTask for ScoreTask {
    const NAME: &'static str = "predictAeoScore";
    type Input = ScoreRequest;
    type Output = AeoScore;

    fn prompt(input: &ScoreRequest) -> Result<String, TaskError> {
        require_text("query", &input.query)?;
        require_text("text", &input.text)?;

        Ok(render(
            SCORE_PROMPT_TEMPLATE,
            &[("query", input.query.as_str()), ("text", input.text.as_str())],
        ))
    }

    fn output_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "aeoScore": score_property("The overall AEO score (0-100)."),
                "breakdown": {
                    "type": "OBJECT",
                    "properties": {
                        "lengthScore": score_property("Score based on content length."),
                        "structureScore": score_property("Score based on content structure (lists, tables, etc.)."),
                        "schemaScore": score_property("Score based on the presence of schema markup."),
                        "intentMatchScore": score_property("Score based on the semantic similarity between query and content."),
                        "readabilityScore": score_property("Score based on the readability of the content.")
                    },
                    "required": ["lengthScore", "structureScore", "schemaScore", "intentMatchScore", "readabilityScore"]
                },
                "suggestions": {
                    "type": "ARRAY",
                    "items": {"type": "STRING"},
                    "description": "Suggestions for improving the content AEO score."
                }
            },
            "required": ["aeoScore", "breakdown", "suggestions"]
        })
    }

    fn check_output(_input: &ScoreRequest, mut output: AeoScore) -> Result<AeoScore, String> {
        output.validate()?;
        output.suggestions.retain(|s| !s.trim().is_empty());
        Ok(output)
    }
}

/// Predicts the AEO score of `text` for `query`.
pub async fn predict_score(
    request: &ScoreRequest,
    invoker: &PromptInvoker,
) -> Result<AeoScore, TaskError> {
    invoker.invoke::<ScoreTask>(request).await
}
