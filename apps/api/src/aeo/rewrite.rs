//! Content rewriting in one of a fixed set of styles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::aeo::invoker::{require_positive, require_text, PromptInvoker, PromptTask};
use crate::aeo::prompts::REWRITE_PROMPT_TEMPLATE;
use crate::errors::TaskError;
use crate::llm_client::prompts::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewriteStyle {
    #[serde(rename = "concise")]
    Concise,
    #[serde(rename = "conversational")]
    Conversational,
    #[serde(rename = "voice-search friendly", alias = "voice-search-friendly")]
    VoiceSearchFriendly,
    #[serde(rename = "formal")]
    Formal,
}

impl RewriteStyle {
    pub const ALL: [RewriteStyle; 4] = [
        RewriteStyle::Concise,
        RewriteStyle::Conversational,
        RewriteStyle::VoiceSearchFriendly,
        RewriteStyle::Formal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RewriteStyle::Concise => "concise",
            RewriteStyle::Conversational => "conversational",
            RewriteStyle::VoiceSearchFriendly => "voice-search friendly",
            RewriteStyle::Formal => "formal",
        }
    }
}

impl fmt::Display for RewriteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewriteStyle {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "concise" => Ok(RewriteStyle::Concise),
            "conversational" => Ok(RewriteStyle::Conversational),
            "voice-search friendly" | "voice-search-friendly" => {
                Ok(RewriteStyle::VoiceSearchFriendly)
            }
            "formal" => Ok(RewriteStyle::Formal),
            other => Err(TaskError::Validation(format!(
                "style must be one of: {}; got '{other}'",
                RewriteStyle::ALL.map(|s| s.as_str()).join(", ")
            ))),
        }
    }
}

/// Style arrives as a plain string so an unknown value is reported as a
/// validation error rather than a body-parse failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteRequest {
    pub text: String,
    pub style: String,
    #[serde(default)]
    pub max_length: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResult {
    pub rewritten_text: String,
}

pub struct RewriteTask;

impl PromptTask for RewriteTask {
    const NAME: &'static str = "rewriteContent";
    type Input = RewriteRequest;
    type Output = RewriteResult;

    fn prompt(input: &RewriteRequest) -> Result<String, TaskError> {
        require_text("text", &input.text)?;
        let style: RewriteStyle = input.style.parse()?;
        let max_length = match input.max_length {
            Some(raw) => format!("{} characters", require_positive("maxLength", raw)?),
            None => "No limit".to_string(),
        };

        Ok(render(
            REWRITE_PROMPT_TEMPLATE,
            &[
                ("text", input.text.as_str()),
                ("style", style.as_str()),
                ("max_length", max_length.as_str()),
            ],
        ))
    }

    fn output_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "rewrittenText": {"type": "STRING", "description": "The rewritten content."}
            },
            "required": ["rewrittenText"]
        })
    }

    fn check_output(input: &RewriteRequest, output: RewriteResult) -> Result<RewriteResult, String> {
        if output.rewritten_text.trim().is_empty() {
            return Err("rewrittenText is empty".to_string());
        }
        if let Some(max) = input.max_length {
            let len = output.rewritten_text.chars().count();
            if len as i64 > max {
                warn!("Rewrite exceeded requested length: {len} > {max} characters");
            }
        }
        Ok(output)
    }
}

/// Rewrites content in the requested style.
pub async fn rewrite_content(
    request: &RewriteRequest,
    invoker: &PromptInvoker,
) -> Result<RewriteResult, TaskError> {
    invoker.invoke::<RewriteTask>(request).await
}
