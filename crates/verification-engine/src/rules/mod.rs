//! Cross-validation and mechanical text rules
//!
//! Number checks look across the whole document (indicators, text and
//! tables) and report with `Source::Numbers`. The format and terminology
//! rules work on text units alone and report with `Source::Rule`.

pub mod format;
pub mod horizon;
pub mod ratio;
pub mod table_sums;
pub mod terminology;

use shared_types::{DocumentModel, Finding, IndicatorSet};

use crate::config::ValidationConfig;

/// A document-wide consistency check over extracted numbers
pub trait CrossCheck: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn check(
        &self,
        indicators: &IndicatorSet,
        model: &DocumentModel,
        config: &ValidationConfig,
    ) -> Vec<Finding>;
}

/// Number checks in reporting order
pub const NUMBER_CHECKS: &[&dyn CrossCheck] = &[
    &ratio::RatioCheck,
    &horizon::HorizonCheck,
    &table_sums::TableSumCheck,
];
