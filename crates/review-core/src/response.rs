//! Parsing of raw reviewer output
//!
//! Reviewers are asked for a single JSON object but routinely wrap it in a
//! code fence or surround it with prose. Anything that still does not parse
//! is reported as [`ReviewResponse::Unparseable`] rather than an error.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use shared_types::{Finding, Severity, Source, NO_PRECEDING_PARAGRAPH};

lazy_static! {
    static ref FENCED_JSON: Regex = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewResponse {
    Parsed {
        summary: String,
        issues: Vec<Finding>,
    },
    Unparseable,
}

impl ReviewResponse {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ReviewResponse::Parsed { .. })
    }
}

/// Cut the JSON object candidate out of a raw response
fn json_candidate(raw: &str) -> &str {
    let text = raw.trim();
    if let Some(inner) = FENCED_JSON.captures(text).and_then(|c| c.get(1)) {
        return inner.as_str();
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

fn text_field(item: &Map<String, Value>, key: &str) -> String {
    match item.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

fn paragraph_field(item: &Map<String, Value>) -> i64 {
    match item.get("para_index") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(NO_PRECEDING_PARAGRAPH),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(NO_PRECEDING_PARAGRAPH),
        _ => NO_PRECEDING_PARAGRAPH,
    }
}

fn severity_field(item: &Map<String, Value>) -> Severity {
    match item.get("severity") {
        None | Some(Value::Null) => Severity::Suggestion,
        Some(Value::String(s)) => Severity::from_label(s),
        Some(_) => Severity::Note,
    }
}

/// Coerce one reviewer issue into a finding; non-objects are skipped
fn issue_to_finding(value: &Value) -> Option<Finding> {
    let item = value.as_object()?;
    Some(Finding::new(
        paragraph_field(item),
        text_field(item, "comment"),
        severity_field(item),
        text_field(item, "matched"),
        Source::Ai,
    ))
}

pub fn parse_response(raw: &str) -> ReviewResponse {
    let data: Value = match serde_json::from_str(json_candidate(raw)) {
        Ok(data) => data,
        Err(_) => return ReviewResponse::Unparseable,
    };
    let object = match data.as_object() {
        Some(object) => object,
        None => return ReviewResponse::Unparseable,
    };

    let issues = object
        .get("issues")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(issue_to_finding).collect())
        .unwrap_or_default();

    ReviewResponse::Parsed {
        summary: text_field(object, "summary"),
        issues,
    }
}
