//! Concise, voice-assistant friendly answers extracted from source content.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::aeo::invoker::{require_positive, require_text, PromptInvoker, PromptTask};
use crate::aeo::prompts::CONCISE_ANSWER_PROMPT_TEMPLATE;
use crate::errors::TaskError;
use crate::llm_client::prompts::render;

pub const DEFAULT_MAX_LENGTH: i64 = 150;
pub const DEFAULT_READABILITY_LEVEL: &str = "8th grade";

fn default_max_length() -> i64 {
    DEFAULT_MAX_LENGTH
}

fn default_readability_level() -> String {
    DEFAULT_READABILITY_LEVEL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConciseAnswerRequest {
    pub question: String,
    pub text: String,
    #[serde(default = "default_max_length")]
    pub max_length: i64,
    #[serde(default = "default_readability_level")]
    pub readability_level: String,
}

impl ConciseAnswerRequest {
    pub fn with_defaults(question: String, text: String) -> Self {
        Self {
            question,
            text,
            max_length: DEFAULT_MAX_LENGTH,
            readability_level: default_readability_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConciseAnswer {
    pub answer: String,
}

pub struct ConciseAnswerTask;

impl PromptTask for ConciseAnswerTask {
    const NAME: &'static str = "generateConciseAnswer";
    type Input = ConciseAnswerRequest;
    type Output = ConciseAnswer;

    fn prompt(input: &ConciseAnswerRequest) -> Result<String, TaskError> {
        require_text("question", &input.question)?;
        require_text("text", &input.text)?;
        require_text("readabilityLevel", &input.readability_level)?;
        let max_length = require_positive("maxLength", input.max_length)?.to_string();

        Ok(render(
            CONCISE_ANSWER_PROMPT_TEMPLATE,
            &[
                ("question", input.question.as_str()),
                ("max_length", max_length.as_str()),
                ("text", input.text.as_str()),
                ("readability_level", input.readability_level.as_str()),
            ],
        ))
    }

    fn output_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "answer": {"type": "STRING", "description": "The concise, canonical answer."}
            },
            "required": ["answer"]
        })
    }

    fn check_output(input: &ConciseAnswerRequest, output: ConciseAnswer) -> Result<ConciseAnswer, String> {
        let answer = output.answer.trim();
        if answer.is_empty() {
            return Err("answer is empty".to_string());
        }
        // prompt() already proved max_length is a positive u32
        let max = input.max_length as usize;
        let len = answer.chars().count();
        if len > max {
            warn!("Concise answer exceeded {max} characters ({len}); clipping");
        }
        let answer = clip_to_chars(answer, max);
        if answer.trim().is_empty() {
            return Err("answer is empty after clipping".to_string());
        }
        Ok(ConciseAnswer { answer })
    }
}

/// Shortens `text` to at most `max` characters, preferring to cut at the last
/// whitespace that fits. Falls back to a hard cut for a single long word, or
/// whenever the word-boundary cut would leave nothing but punctuation.
pub fn clip_to_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let hard_cut: String = text.chars().take(max).collect();
    let next_is_boundary = text
        .chars()
        .nth(max)
        .map(char::is_whitespace)
        .unwrap_or(true);
    let boundary_cut = if next_is_boundary {
        hard_cut.trim_end()
    } else {
        match hard_cut.rfind(char::is_whitespace) {
            Some(idx) => hard_cut[..idx]
                .trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == ';' || c == ':'),
            None => "",
        }
    };

    if boundary_cut.trim().is_empty() {
        hard_cut.trim_end().to_string()
    } else {
        boundary_cut.to_string()
    }
}

/// Generates a concise answer to `question` grounded in `text`.
pub async fn generate_concise_answer(
    request: &ConciseAnswerRequest,
    invoker: &PromptInvoker,
) -> Result<ConciseAnswer, TaskError> {
    invoker.invoke::<ConciseAnswerTask>(request).await
}
