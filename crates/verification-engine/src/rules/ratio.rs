// Ratio indicator contradictions and plausibility ranges
use shared_types::{
    DocumentModel, Finding, IndicatorCategory, IndicatorSet, Severity, Source,
    NO_PRECEDING_PARAGRAPH,
};

use super::CrossCheck;
use crate::config::{RatioRange, ValidationConfig};
use crate::patterns::format_number;

pub struct RatioCheck;

impl CrossCheck for RatioCheck {
    fn name(&self) -> &'static str {
        "ratio"
    }

    fn check(
        &self,
        indicators: &IndicatorSet,
        _model: &DocumentModel,
        config: &ValidationConfig,
    ) -> Vec<Finding> {
        check_ratios(indicators, &config.ratio_ranges)
    }
}

struct Occurrence {
    value: f64,
    paragraph: i64,
}

/// Flag ratio indicators that take several values or fall outside their range
pub fn check_ratios(indicators: &IndicatorSet, ranges: &[RatioRange]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for range in ranges {
        let occurrences: Vec<Occurrence> = indicators
            .by_category(IndicatorCategory::Ratio)
            .iter()
            .filter(|ind| ind.context.contains(range.keyword.as_str()))
            .filter_map(|ind| {
                Some(Occurrence {
                    value: ind.value.as_f64()?,
                    paragraph: ind
                        .paragraph
                        .map_or(NO_PRECEDING_PARAGRAPH, |p| p as i64),
                })
            })
            .collect();

        let first = match occurrences.first() {
            Some(first) => first,
            None => continue,
        };

        let mut distinct: Vec<f64> = occurrences.iter().map(|o| o.value).collect();
        distinct.sort_by(|a, b| a.total_cmp(b));
        distinct.dedup();

        if distinct.len() > 1 {
            let values = distinct
                .iter()
                .map(|v| format_number(*v))
                .collect::<Vec<_>>()
                .join("、");
            let paragraphs = occurrences
                .iter()
                .map(|o| o.paragraph.to_string())
                .collect::<Vec<_>>()
                .join("、");
            findings.push(Finding::new(
                first.paragraph,
                format!(
                    "「{}」在文中出现多个不同数值（{}），涉及第 {} 段，请核实是否为不同地块或章节笔误",
                    range.keyword, values, paragraphs
                ),
                Severity::Warning,
                range.keyword.clone(),
                Source::Numbers,
            ));
        }

        for occ in occurrences.iter().filter(|o| !range.contains(o.value)) {
            findings.push(Finding::new(
                occ.paragraph,
                format!(
                    "「{}」数值 {} 超出合理范围（{}–{}），请核实是否笔误或单位有误",
                    range.keyword,
                    format_number(occ.value),
                    format_number(range.min),
                    format_number(range.max)
                ),
                Severity::Warning,
                format_number(occ.value),
                Source::Numbers,
            ));
        }
    }

    findings
}
