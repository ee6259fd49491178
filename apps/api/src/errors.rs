use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Task-level error type shared by every inbound operation.
/// Never crosses the handler boundary as-is: `Envelope` turns it into the
/// uniform `{success: false, error}` body.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Provider temporarily unavailable: {0}")]
    TransientProvider(String),

    #[error("Provider error: {0}")]
    FatalProvider(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<LlmError> for TaskError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ServiceUnavailable { .. } => TaskError::TransientProvider(err.to_string()),
            LlmError::MissingApiKey => TaskError::Configuration(err.to_string()),
            LlmError::EmptyContent | LlmError::Parse(_) => TaskError::Generation(err.to_string()),
            LlmError::Http(_) | LlmError::Api { .. } => TaskError::FatalProvider(err.to_string()),
        }
    }
}

impl TaskError {
    pub fn code(&self) -> &'static str {
        match self {
            TaskError::Validation(_) => "VALIDATION_ERROR",
            TaskError::TransientProvider(_) => "PROVIDER_UNAVAILABLE",
            TaskError::FatalProvider(_) => "PROVIDER_ERROR",
            TaskError::Generation(_) => "GENERATION_ERROR",
            TaskError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            TaskError::Validation(_) => StatusCode::BAD_REQUEST,
            TaskError::TransientProvider(_) | TaskError::Configuration(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            TaskError::FatalProvider(_) | TaskError::Generation(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show an end user. Provider internals stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            TaskError::Validation(msg) => msg.clone(),
            TaskError::TransientProvider(_) => {
                "The AI service is temporarily overloaded. Please try again shortly.".to_string()
            }
            TaskError::Configuration(_) => {
                "The AI service is not configured. Please check your API key and try again."
                    .to_string()
            }
            TaskError::FatalProvider(_) | TaskError::Generation(_) => {
                "Failed to generate a response. Please check your API key and try again."
                    .to_string()
            }
        }
    }
}

/// Uniform response envelope: `{success: true, data}` or
/// `{success: false, error, code}`.
#[derive(Debug)]
pub enum Envelope<T> {
    Success(T),
    Failure(TaskError),
}

impl<T> From<Result<T, TaskError>> for Envelope<T> {
    fn from(result: Result<T, TaskError>) -> Self {
        match result {
            Ok(data) => Envelope::Success(data),
            Err(err) => Envelope::Failure(err),
        }
    }
}

#[derive(Serialize)]
struct SuccessBody<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct FailureBody {
    success: bool,
    error: String,
    code: &'static str,
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        match self {
            Envelope::Success(data) => (
                StatusCode::OK,
                Json(SuccessBody {
                    success: true,
                    data,
                }),
            )
                .into_response(),
            Envelope::Failure(err) => {
                match &err {
                    TaskError::Validation(msg) => tracing::debug!("Rejected request: {msg}"),
                    other => tracing::error!("Task failed: {other}"),
                }
                (
                    err.status(),
                    Json(FailureBody {
                        success: false,
                        error: err.user_message(),
                        code: err.code(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_llm_error_mapping() {
        assert!(matches!(
            TaskError::from(LlmError::ServiceUnavailable {
                message: "overloaded".into()
            }),
            TaskError::TransientProvider(_)
        ));
        assert!(matches!(
            TaskError::from(LlmError::MissingApiKey),
            TaskError::Configuration(_)
        ));
        assert!(matches!(
            TaskError::from(LlmError::EmptyContent),
            TaskError::Generation(_)
        ));
        assert!(matches!(
            TaskError::from(LlmError::Api {
                status: 401,
                message: "bad key".into()
            }),
            TaskError::FatalProvider(_)
        ));
    }

    #[test]
    fn test_user_message_hides_provider_details() {
        let err = TaskError::FatalProvider("API error (status 401): key sk-123 invalid".into());
        assert!(!err.user_message().contains("sk-123"));
    }

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = TaskError::Validation("text cannot be empty".into());
        assert_eq!(err.user_message(), "text cannot be empty");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_success_envelope_shape() {
        let response = Envelope::Success(vec![1, 2, 3]).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_failure_envelope_shape() {
        let envelope: Envelope<()> = Err(TaskError::Generation("no output".into())).into();
        let response = envelope.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "GENERATION_ERROR");
        assert!(body["error"].as_str().unwrap().starts_with("Failed to generate"));
        assert!(body.get("data").is_none());
    }
}
