//! Raw SERP JSON → ranked `CompetitorResult`s.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum results surfaced to the caller.
pub const MAX_RESULTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorResult {
    /// 1-indexed position in provider relevance order.
    pub rank: u32,
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

/// Upstream response. Entries stay untyped so one malformed entry cannot
/// fail the whole page; each is checked on its own.
#[derive(Debug, Default, Deserialize)]
pub struct SerpResponse {
    #[serde(default)]
    pub organic: Vec<Value>,
}

/// Returns (title, link, snippet) when all three are non-blank strings.
/// Anything else, including an entry that is not an object, is skipped.
fn complete_entry(entry: Value) -> Option<(String, String, String)> {
    let field = |name: &str| {
        entry
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };
    Some((field("title")?, field("link")?, field("snippet")?))
}

/// Drops incomplete entries, keeps the first `MAX_RESULTS` in provider order,
/// and assigns `rank = position + 1`.
pub fn to_competitor_results(response: SerpResponse) -> Vec<CompetitorResult> {
    response
        .organic
        .into_iter()
        .filter_map(complete_entry)
        .take(MAX_RESULTS)
        .enumerate()
        .map(|(idx, (title, link, snippet))| CompetitorResult {
            rank: idx as u32 + 1,
            domain: derive_domain(&link),
            title,
            link,
            snippet,
            analysis: None,
        })
        .collect()
}

/// Host of `link` without a leading `www.`; the raw link when it does not
/// parse or has no host.
pub fn derive_domain(link: &str) -> String {
    match Url::parse(link.trim()).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(host) => host
            .strip_prefix("www.")
            .map(str::to_string)
            .unwrap_or(host),
        None => link.to_string(),
    }
}
