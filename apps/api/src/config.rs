use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_MODEL;
use crate::retry::DEFAULT_MAX_RETRIES;

/// Application configuration loaded from environment variables.
/// Provider credentials are optional: a missing key puts the matching
/// integration into degraded mode instead of aborting startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_max_retries: u32,
    pub serper_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: optional_env("GEMINI_API_KEY").or_else(|| optional_env("GOOGLE_API_KEY")),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_max_retries: match optional_env("LLM_MAX_RETRIES") {
                Some(raw) => raw
                    .parse::<u32>()
                    .context("LLM_MAX_RETRIES must be a non-negative integer")?,
                None => DEFAULT_MAX_RETRIES,
            },
            serper_api_key: optional_env("SERPER_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    non_blank(std::env::var(key).ok())
}

/// Blank credentials are treated the same as unset ones.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
