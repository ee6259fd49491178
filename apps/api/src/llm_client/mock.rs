//! Scripted `LlmProvider` double for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{LlmError, LlmProvider, PromptRequest};

/// Replays queued responses in order and records every request it receives.
/// Once the script runs out it keeps returning `EmptyContent`.
#[derive(Default)]
pub struct MockLlm {
    script: Mutex<VecDeque<Result<Value, LlmError>>>,
    requests: Mutex<Vec<PromptRequest>>,
    calls: AtomicUsize,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, value: Value) -> Self {
        self.script.lock().unwrap().push_back(Ok(value));
        self
    }

    pub fn fail(self, err: LlmError) -> Self {
        self.script.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.requests.lock().unwrap().last().map(|r| r.prompt.clone())
    }

    pub fn tasks(&self) -> Vec<&'static str> {
        self.requests.lock().unwrap().iter().map(|r| r.task).collect()
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn generate(&self, request: &PromptRequest) -> Result<Value, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }

    fn is_configured(&self) -> bool {
        true
    }
}
