//! Numeric indicator extraction and rule-based verification of planning
//! documents.

pub mod config;
pub mod extractors;
pub mod patterns;
pub mod rules;

use serde::{Deserialize, Serialize};
use shared_types::{dedup_findings, DocumentModel, Finding, IndicatorSet};
use tracing::{debug, info};

pub use config::{RatioRange, TermRule, Tolerance, ValidationConfig};
pub use extractors::{extract_indicators, find_in_text, parse_cell_number};
pub use rules::table_sums::remove_sub_items;
pub use rules::CrossCheck;

/// Everything the rule engine found in one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub indicators: IndicatorSet,
    /// Format and terminology findings
    pub rule_findings: Vec<Finding>,
    /// Cross-validation findings
    pub number_findings: Vec<Finding>,
}

impl VerificationReport {
    /// Rule findings followed by number findings, deduplicated
    pub fn findings(&self) -> Vec<Finding> {
        dedup_findings(
            self.rule_findings
                .iter()
                .chain(self.number_findings.iter())
                .cloned(),
        )
    }
}

/// Run every cross-check over a document's indicators, text and tables
pub fn cross_validate(
    indicators: &IndicatorSet,
    model: &DocumentModel,
    config: &ValidationConfig,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for check in rules::NUMBER_CHECKS {
        let found = check.check(indicators, model, config);
        debug!(check = check.name(), count = found.len(), "cross-check done");
        findings.extend(found);
    }
    findings
}

/// VerificationEngine entry point
pub struct VerificationEngine {
    config: ValidationConfig,
}

impl VerificationEngine {
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn check_document(&self, model: &DocumentModel) -> VerificationReport {
        let indicators = extract_indicators(model);
        let rule_findings = self.check_rules(model);
        let number_findings = cross_validate(&indicators, model, &self.config);

        info!(
            indicators = indicators.len(),
            rule_findings = rule_findings.len(),
            number_findings = number_findings.len(),
            "verification complete"
        );

        VerificationReport {
            indicators,
            rule_findings,
            number_findings,
        }
    }

    /// Format and terminology findings, deduplicated and ordered by paragraph
    pub fn check_rules(&self, model: &DocumentModel) -> Vec<Finding> {
        let units = model.text_units();
        let mut findings = rules::format::check_format(&units);
        findings.extend(rules::terminology::check_terminology(
            &units,
            &self.config.terminology,
        ));

        let mut findings = dedup_findings(findings);
        findings.sort_by_key(|f| f.paragraph_index);
        findings
    }

    /// Check format rules on raw text (for testing)
    pub fn check_text(&self, text: &str) -> Vec<Finding> {
        rules::format::check_unit(0, text)
    }
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::new()
    }
}
