//! Prompt Invoker — validates task input, renders the template, calls the
//! provider through the retry wrapper, and validates the structured output.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::errors::TaskError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmProvider, PromptRequest};
use crate::retry::{retry_with_backoff, RetryPolicy};

/// A single LLM-backed task: typed input, typed output, template and the
/// JSON schema the provider must honour.
pub trait PromptTask {
    const NAME: &'static str;

    type Input: Sync;
    type Output: DeserializeOwned + Send;

    /// Validates `input` and renders the prompt. Invalid input must fail here,
    /// before anything is sent to the provider.
    fn prompt(input: &Self::Input) -> Result<String, TaskError>;

    /// Declared output schema sent alongside the prompt.
    fn output_schema() -> Value;

    /// Checks constraints serde cannot express (ranges, lengths) and may
    /// normalise the output.
    fn check_output(input: &Self::Input, output: Self::Output) -> Result<Self::Output, String>;
}

#[derive(Clone)]
pub struct PromptInvoker {
    llm: Arc<dyn LlmProvider>,
    retry: RetryPolicy,
}

impl PromptInvoker {
    pub fn new(llm: Arc<dyn LlmProvider>, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_configured()
    }

    pub async fn invoke<T: PromptTask>(&self, input: &T::Input) -> Result<T::Output, TaskError> {
        let request = PromptRequest {
            task: T::NAME,
            system: JSON_ONLY_SYSTEM,
            prompt: T::prompt(input)?,
            output_schema: T::output_schema(),
        };

        let raw = retry_with_backoff(self.retry, || self.llm.generate(&request)).await?;

        if raw.is_null() {
            return Err(TaskError::Generation(format!("{} returned no output", T::NAME)));
        }

        let output: T::Output = serde_json::from_value(raw).map_err(|e| {
            TaskError::Generation(format!("{} output did not match schema: {e}", T::NAME))
        })?;

        let output = T::check_output(input, output)
            .map_err(|reason| TaskError::Generation(format!("{}: {reason}", T::NAME)))?;

        debug!("Task {} produced a valid output", T::NAME);
        Ok(output)
    }
}

/// Shared input check: trimmed text must be non-empty.
pub fn require_text(field: &str, value: &str) -> Result<(), TaskError> {
    if value.trim().is_empty() {
        return Err(TaskError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Shared input check: length limits must be positive integers.
pub fn require_positive(field: &str, value: i64) -> Result<u32, TaskError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| TaskError::Validation(format!("{field} must be a positive integer")))
}
