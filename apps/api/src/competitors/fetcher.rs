//! Competitor Fetcher — live SERP lookup that degrades to an empty list.
//!
//! Contract: no credential or any failure → `[]`. Callers treat an empty list
//! as "no data available", never as an error. Search calls are not retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::competitors::transform::{to_competitor_results, CompetitorResult, SerpResponse};

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
/// Results requested upstream; more than we surface, to survive filtering.
pub const UPSTREAM_RESULT_COUNT: u32 = 5;
const SEARCH_TIMEOUT_SECS: u64 = 15;
const ERROR_BODY_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search API key is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Transport seam so the fetch/transform pipeline can be exercised without
/// network access.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, api_key: &str, query: &str, num: u32) -> Result<SerpResponse, SearchError>;
}

/// Serper.dev transport.
pub struct SerperBackend {
    client: Client,
    endpoint: String,
}

impl SerperBackend {
    pub fn new() -> Result<Self, SearchError> {
        Self::with_endpoint(SERPER_ENDPOINT)
    }

    /// Targets a different search URL (a regional proxy, or a local mock).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, SearchError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
                .build()?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SearchBackend for SerperBackend {
    async fn search(&self, api_key: &str, query: &str, num: u32) -> Result<SerpResponse, SearchError> {
        let num = num.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("num", num.as_str()), ("gl", "us"), ("hl", "en")])
            .header("X-API-KEY", api_key)
            .header("content-type", "application/json")
            // results must reflect the live query
            .header("cache-control", "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Clone)]
pub struct CompetitorFetcher {
    api_key: Option<String>,
    backend: Arc<dyn SearchBackend>,
}

impl CompetitorFetcher {
    pub fn new(api_key: Option<String>, backend: Arc<dyn SearchBackend>) -> Self {
        Self { api_key, backend }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Top competitor results for `query`, or `[]` when unavailable.
    pub async fn fetch(&self, query: &str) -> Vec<CompetitorResult> {
        match self.try_fetch(query).await {
            Ok(results) => results,
            Err(SearchError::MissingApiKey) => {
                warn!("SERPER_API_KEY is not set; live competitor fetching is disabled");
                Vec::new()
            }
            Err(e) => {
                error!("Competitor fetch failed for query {query:?}: {e}");
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, query: &str) -> Result<Vec<CompetitorResult>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;

        let query = query.trim();
        if query.is_empty() {
            debug!("Empty competitor query; skipping search");
            return Ok(Vec::new());
        }

        info!("Fetching competitors for query {query:?}");
        let response = self
            .backend
            .search(api_key, query, UPSTREAM_RESULT_COUNT)
            .await?;

        let results = to_competitor_results(response);
        debug!("Competitor fetch returned {} results", results.len());
        Ok(results)
    }
}
