//! schema.org JSON-LD generation for a query and its answer.
//! Pure and deterministic given `today`; no LLM involved.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::aeo::invoker::require_text;
use crate::errors::TaskError;

const SCHEMA_CONTEXT: &str = "https://schema.org";
const DESCRIPTION_MAX_CHARS: usize = 150;
const DEFAULT_AUTHOR: &str = "Author Name";
const DEFAULT_PAGE_URL: &str = "https://your-website.com/your-page";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaType {
    #[default]
    Article,
    #[serde(rename = "FAQPage")]
    FaqPage,
    #[serde(rename = "QAPage")]
    QaPage,
    HowTo,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Article => "Article",
            SchemaType::FaqPage => "FAQPage",
            SchemaType::QaPage => "QAPage",
            SchemaType::HowTo => "HowTo",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMarkupRequest {
    pub query: String,
    pub answer: String,
    #[serde(default)]
    pub schema_type: SchemaType,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
}

/// Builds the JSON-LD object for `request`. `today` fills `datePublished`.
pub fn build_schema_markup(request: &SchemaMarkupRequest, today: NaiveDate) -> Result<Value, TaskError> {
    require_text("query", &request.query)?;
    require_text("answer", &request.answer)?;

    let headline = title_case(request.query.trim());
    let answer = request.answer.trim();

    let mut schema = Map::new();
    schema.insert("@context".into(), json!(SCHEMA_CONTEXT));
    schema.insert("@type".into(), json!(request.schema_type.as_str()));

    let body = match request.schema_type {
        SchemaType::Article => json!({
            "headline": headline,
            "description": describe(answer),
            "author": {
                "@type": "Person",
                "name": non_blank_or(request.author.as_deref(), DEFAULT_AUTHOR),
            },
            "datePublished": today.format("%Y-%m-%d").to_string(),
            "mainEntityOfPage": non_blank_or(request.page_url.as_deref(), DEFAULT_PAGE_URL),
        }),
        SchemaType::FaqPage => json!({
            "mainEntity": [question(&headline, answer)],
        }),
        SchemaType::QaPage => {
            let mut entity = question(&headline, answer);
            entity["answerCount"] = json!(1);
            json!({ "mainEntity": entity })
        }
        SchemaType::HowTo => json!({
            "name": headline,
            "step": split_sentences(answer)
                .into_iter()
                .map(|text| json!({"@type": "HowToStep", "text": text}))
                .collect::<Vec<_>>(),
        }),
    };

    if let Value::Object(fields) = body {
        schema.extend(fields);
    }
    Ok(Value::Object(schema))
}

fn question(name: &str, answer: &str) -> Value {
    json!({
        "@type": "Question",
        "name": name,
        "acceptedAnswer": {
            "@type": "Answer",
            "text": answer,
        },
    })
}

fn non_blank_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(fallback)
}

/// Upper-cases the first letter of every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start && !c.is_whitespace() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    out
}

fn describe(answer: &str) -> String {
    if answer.chars().count() <= DESCRIPTION_MAX_CHARS {
        return answer.to_string();
    }
    let head: String = answer.chars().take(DESCRIPTION_MAX_CHARS).collect();
    format!("{head}...")
}

/// Splits on sentence-ending punctuation followed by whitespace.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let ends_sentence = matches!(c, '.' | '!' | '?')
            && chars.peek().map(|n| n.is_whitespace()).unwrap_or(true);
        if ends_sentence {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }
    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}
