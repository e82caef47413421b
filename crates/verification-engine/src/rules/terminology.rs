// Document-wide terminology consistency
use shared_types::{Finding, Paragraph, Severity, Source};

use crate::config::TermRule;

/// Report each non-preferred variant once, at its first paragraph
pub fn check_terminology(units: &[Paragraph], rules: &[TermRule]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for rule in rules {
        for variant in &rule.variants {
            let paragraphs: Vec<usize> = units
                .iter()
                .filter(|u| u.text.contains(variant.as_str()))
                .map(|u| u.index)
                .collect();
            let first = match paragraphs.first() {
                Some(first) => *first,
                None => continue,
            };
            let listed = paragraphs
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("、");

            findings.push(Finding::new(
                first as i64,
                format!(
                    "[术语] 「{}」出现在第 {} 段，{}。建议全文统一使用「{}」。",
                    variant, listed, rule.note, rule.preferred
                ),
                Severity::Warning,
                variant.clone(),
                Source::Rule,
            ));
        }
    }
    findings
}
