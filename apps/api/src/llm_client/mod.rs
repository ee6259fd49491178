/// LLM Client — the single point of entry for all Gemini API calls in AnswerFirst.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// All LLM interactions MUST go through the `LlmProvider` trait.
///
/// Requests carry a declared JSON output schema; the provider is asked for
/// `application/json` output constrained to that schema.
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::retry::Transient;

#[cfg(test)]
pub mod mock;
pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Default model; override with `LLM_MODEL`.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("[503 Service Unavailable] {message}")]
    ServiceUnavailable { message: String },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM API key is not configured")]
    MissingApiKey,
}

impl Transient for LlmError {
    fn is_transient(&self) -> bool {
        matches!(self, LlmError::ServiceUnavailable { .. })
    }
}

/// A fully built prompt: template already rendered, plus the output contract.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub task: &'static str,
    pub system: &'static str,
    pub prompt: String,
    pub output_schema: Value,
}

/// The provider seam. `AppState` holds an `Arc<dyn LlmProvider>`; tests swap
/// in a scripted double.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends the request and returns the raw JSON value produced by the model.
    async fn generate(&self, request: &PromptRequest) -> Result<Value, LlmError>;

    fn is_configured(&self) -> bool;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Extracts the text of the first non-empty part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .find(|t| !t.trim().is_empty())
            })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The Gemini-backed provider.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, model: String) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, model, GEMINI_API_BASE)
    }

    /// `base_url` is the models collection; `/{model}:generateContent` is appended.
    pub fn with_base_url(
        api_key: Option<String>,
        model: String,
        base_url: impl Into<String>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            model,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl LlmProvider for LlmClient {
    async fn generate(&self, request: &PromptRequest) -> Result<Value, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: request.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.output_schema,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("LLM API returned {} for task {}: {}", status, request.task, body);
            return Err(classify_failure(status, &body));
        }

        let response: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "LLM call succeeded: task={}, prompt_tokens={}, output_tokens={}",
                request.task, usage.prompt_token_count, usage.candidates_token_count
            );
        }

        let text = response.text().ok_or(LlmError::EmptyContent)?;
        parse_json_output(text)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Maps a non-2xx provider status onto the error taxonomy.
/// Only 503 is transient; everything else fails fast.
fn classify_failure(status: StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::SERVICE_UNAVAILABLE {
        LlmError::ServiceUnavailable { message }
    } else {
        LlmError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Parses model text as JSON, tolerating markdown fences around it.
pub fn parse_json_output(text: &str) -> Result<Value, LlmError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::aeo::concise::{generate_concise_answer, ConciseAnswerRequest};
    use crate::aeo::PromptInvoker;
    use crate::errors::TaskError;
    use crate::retry::RetryPolicy;

    const GENERATE_PATH: &str = "/v1beta/models/test-model:generateContent";

    fn mock_client(mock_server: &MockServer) -> LlmClient {
        LlmClient::with_base_url(
            Some("test_key".into()),
            "test-model".into(),
            format!("{}/v1beta/models", mock_server.uri()),
        )
        .unwrap()
    }

    fn candidate(text: &str) -> Value {
        json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}],
            "usageMetadata": {"promptTokenCount": 20, "candidatesTokenCount": 8}
        })
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
        }
    }

    fn simple_request() -> PromptRequest {
        PromptRequest {
            task: "test",
            system: "sys",
            prompt: "hello".to_string(),
            output_schema: json!({"type": "OBJECT"}),
        }
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_json_output_empty_text() {
        assert!(matches!(parse_json_output("  "), Err(LlmError::EmptyContent)));
    }

    #[test]
    fn test_parse_json_output_garbage() {
        assert!(matches!(
            parse_json_output("I cannot help with that"),
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn test_503_is_transient() {
        let err = classify_failure(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error": {"code": 503, "message": "The model is overloaded."}}"#,
        );
        assert!(err.is_transient());
        assert!(err.to_string().contains("The model is overloaded."));
        assert!(err.to_string().contains("[503 Service Unavailable]"));
    }

    #[test]
    fn test_other_statuses_are_fatal() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let err = classify_failure(status, "nope");
            assert!(!err.is_transient(), "{status} should not be transient");
            match err {
                LlmError::Api { status: s, message } => {
                    assert_eq!(s, status.as_u16());
                    assert_eq!(message, "nope");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_key_is_not_transient() {
        assert!(!LlmError::MissingApiKey.is_transient());
        assert!(!LlmError::EmptyContent.is_transient());
    }

    #[test]
    fn test_response_text_skips_empty_parts() {
        let raw = json!({
            "candidates": [{
                "content": {"parts": [{"text": ""}, {"text": "{\"answer\": \"hi\"}"}]}
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
        });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.text(), Some("{\"answer\": \"hi\"}"));
        assert_eq!(response.usage_metadata.unwrap().prompt_token_count, 12);
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let schema = json!({"type": "object"});
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: "sys" }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &schema,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_without_network() {
        let client = LlmClient::new(None, DEFAULT_MODEL.to_string()).unwrap();
        assert!(!client.is_configured());
        let request = PromptRequest {
            task: "test",
            system: "sys",
            prompt: "hello".to_string(),
            output_schema: json!({}),
        };
        assert!(matches!(
            client.generate(&request).await,
            Err(LlmError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_generate_posts_schema_and_parses_fenced_reply() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test_key"))
            .and(body_partial_json(json!({
                "systemInstruction": {"parts": [{"text": "sys"}]},
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {"type": "OBJECT"}
                }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate("```json\n{\"answer\": \"hi\"}\n```")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let value = mock_client(&mock_server).generate(&simple_request()).await.unwrap();

        assert_eq!(value, json!({"answer": "hi"}));
    }

    #[tokio::test]
    async fn test_http_503_maps_to_service_unavailable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}
            })))
            .mount(&mock_server)
            .await;

        let err = mock_client(&mock_server)
            .generate(&simple_request())
            .await
            .unwrap_err();

        assert!(err.is_transient());
        match err {
            LlmError::ServiceUnavailable { message } => assert_eq!(message, "The model is overloaded."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_503_is_retried_until_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
                r#"{"answer": "AEO structures content so answer engines can quote it."}"#,
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let invoker = PromptInvoker::new(Arc::new(mock_client(&mock_server)), fast_retry());
        let request = ConciseAnswerRequest::with_defaults("what is AEO".into(), "content".into());

        let answer = generate_concise_answer(&request, &invoker).await.unwrap();

        assert!(answer.answer.starts_with("AEO structures content"));
    }

    #[tokio::test]
    async fn test_http_400_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid."}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let invoker = PromptInvoker::new(Arc::new(mock_client(&mock_server)), fast_retry());
        let request = ConciseAnswerRequest::with_defaults("what is AEO".into(), "content".into());

        let result = generate_concise_answer(&request, &invoker).await;

        assert!(matches!(result, Err(TaskError::FatalProvider(_))));
    }
}
