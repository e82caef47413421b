//! Tunable thresholds for cross-validation

use serde::{Deserialize, Serialize};

use crate::patterns::{RATIO_RANGES, TERMINOLOGY};

/// Tolerance of `max(|value| * relative, absolute)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub relative: f64,
    pub absolute: f64,
}

impl Tolerance {
    pub const fn new(relative: f64, absolute: f64) -> Self {
        Self { relative, absolute }
    }

    pub fn for_value(&self, value: f64) -> f64 {
        (value.abs() * self.relative).max(self.absolute)
    }

    pub fn matches(&self, actual: f64, expected: f64) -> bool {
        (actual - expected).abs() <= self.for_value(expected)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(0.01, 0.11)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioRange {
    pub keyword: String,
    pub min: f64,
    pub max: f64,
}

impl RatioRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRule {
    pub preferred: String,
    pub variants: Vec<String>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Indicators checked for contradictions and plausible ranges
    pub ratio_ranges: Vec<RatioRange>,
    /// Used when folding nested sub-items into their parent row
    pub subitem_tolerance: Tolerance,
    /// Used when comparing a computed sum with the stated total
    pub total_tolerance: Tolerance,
    pub terminology: Vec<TermRule>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ratio_ranges: RATIO_RANGES
                .iter()
                .map(|(keyword, min, max)| RatioRange {
                    keyword: keyword.to_string(),
                    min: *min,
                    max: *max,
                })
                .collect(),
            subitem_tolerance: Tolerance::default(),
            total_tolerance: Tolerance::default(),
            terminology: TERMINOLOGY
                .iter()
                .map(|(preferred, variants, note)| TermRule {
                    preferred: preferred.to_string(),
                    variants: variants.iter().map(|v| v.to_string()).collect(),
                    note: note.to_string(),
                })
                .collect(),
        }
    }
}
