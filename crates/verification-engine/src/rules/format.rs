// Mechanical format checks on single text units
use shared_types::{Finding, Paragraph, Severity, Source};

use crate::patterns::{is_cjk, FORMAT_RULES, REDUPLICATION_GUARDS, REPEATED_WORD_MESSAGE};

const REPEAT_MIN: usize = 2;
const REPEAT_MAX: usize = 4;

fn format_finding(index: i64, message: &str, matched: &str, severity: Severity) -> Finding {
    Finding::new(
        index,
        format!("[格式] {}（匹配：{}）", message, matched),
        severity,
        matched,
        Source::Rule,
    )
}

/// First word of 2-4 CJK characters written twice in a row, e.g. `规划规划`.
///
/// Doubling right after or before 一/各/每 is a normal distributive form and
/// is skipped. Longer words win at the same starting position.
pub fn find_repeated_word(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();

    for start in 0..chars.len() {
        if start > 0 && REDUPLICATION_GUARDS.contains(&chars[start - 1]) {
            continue;
        }
        for len in (REPEAT_MIN..=REPEAT_MAX).rev() {
            let end = start + 2 * len;
            if end > chars.len() {
                continue;
            }
            let (word, repeat) = (&chars[start..start + len], &chars[start + len..end]);
            if word != repeat || !word.iter().all(|c| is_cjk(*c)) {
                continue;
            }
            if chars.get(end).is_some_and(|c| REDUPLICATION_GUARDS.contains(c)) {
                continue;
            }
            return Some(word.iter().collect());
        }
    }
    None
}

/// Run every format rule over one text unit, reporting the first match of each
pub fn check_unit(index: i64, text: &str) -> Vec<Finding> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut findings: Vec<Finding> = FORMAT_RULES
        .iter()
        .filter_map(|(pattern, message, severity)| {
            let m = pattern.find(text)?;
            Some(format_finding(index, message, m.as_str(), *severity))
        })
        .collect();

    if let Some(word) = find_repeated_word(text) {
        findings.push(format_finding(
            index,
            REPEATED_WORD_MESSAGE,
            &word,
            Severity::Suggestion,
        ));
    }
    findings
}

pub fn check_format(units: &[Paragraph]) -> Vec<Finding> {
    units
        .iter()
        .flat_map(|unit| check_unit(unit.index as i64, &unit.text))
        .collect()
}
