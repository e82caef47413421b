//! Findings exchanged between the rule engine, the reviewer and the annotator

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
    /// Anything an external producer sent that is not one of the above
    #[serde(other)]
    Note,
}

impl Severity {
    /// Parse a severity label, mapping unknown labels to `Note`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            "suggestion" => Severity::Suggestion,
            _ => Severity::Note,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Error => "[error]",
            Severity::Warning => "[warning]",
            Severity::Suggestion => "[suggestion]",
            Severity::Note => "[note]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Rule,
    Numbers,
    Ai,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Finding {
    #[serde(rename = "para_index")]
    pub paragraph_index: i64, // -1 = unlocated
    pub comment: String,
    pub severity: Severity,
    #[serde(default)]
    pub matched: String,
    pub source: Source,
}

impl Finding {
    pub fn new(
        paragraph_index: i64,
        comment: impl Into<String>,
        severity: Severity,
        matched: impl Into<String>,
        source: Source,
    ) -> Self {
        Self {
            paragraph_index,
            comment: comment.into(),
            severity,
            matched: matched.into(),
            source,
        }
    }

    pub fn is_located(&self) -> bool {
        self.paragraph_index >= 0
    }
}

/// Keep the first finding per `(paragraph_index, matched)`, preserving order
pub fn dedup_findings<I>(findings: I) -> Vec<Finding>
where
    I: IntoIterator<Item = Finding>,
{
    let mut seen: HashSet<(i64, String)> = HashSet::new();
    findings
        .into_iter()
        .filter(|f| seen.insert((f.paragraph_index, f.matched.clone())))
        .collect()
}
