//! Reviewing page-based documents, where pages stand in for paragraphs

use pretty_assertions::assert_eq;
use review_core::{review_document, ReferenceRules, ReviewConfig, ReviewRequest};
use shared_types::{DocumentModel, Finding, IndicatorSet, Page, Severity, Source};

fn pdf_model() -> DocumentModel {
    let pages = vec![
        Page {
            number: 1,
            text: "第一页：规划概况".to_string(),
        },
        Page {
            number: 2,
            text: "第二页：用地布局".to_string(),
        },
    ];
    let full_text = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    DocumentModel::FlatText { pages, full_text }
}

#[test]
fn pages_are_reviewed_as_indexed_units() {
    let model = pdf_model();
    let indicators = IndicatorSet::new();
    let rules = ReferenceRules::from_text("用语规范");
    let known = vec![Finding::new(
        1,
        "已知问题",
        Severity::Warning,
        "用地",
        Source::Rule,
    )];
    let request = ReviewRequest {
        model: &model,
        indicators: &indicators,
        known_issues: &known,
        reference_rules: &rules,
    };

    let mut seen = Vec::new();
    let mut reviewer = |prompt: &str| -> anyhow::Result<String> {
        seen.push(prompt.to_string());
        Ok(r#"```json
{"summary": "整体良好", "issues": [{"para_index": 1, "comment": "「用地布局」表述可细化", "severity": "suggestion", "matched": "用地布局"}]}
```"#
            .to_string())
    };

    let outcome = review_document(&request, &ReviewConfig::default(), &mut reviewer).unwrap();

    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("[0] 第一页：规划概况"));
    assert!(seen[0].contains("[1] 第二页：用地布局"));
    assert!(seen[0].contains("- 第1段：已知问题"));
    assert!(seen[0].contains("用语规范"));
    assert_eq!(outcome.summary, "整体良好");
    assert_eq!(
        outcome.findings,
        vec![Finding::new(
            1,
            "「用地布局」表述可细化",
            Severity::Suggestion,
            "用地布局",
            Source::Ai
        )]
    );
}
