// Target years beyond the stated planning horizon
use shared_types::{DocumentModel, Finding, IndicatorSet, Paragraph, Severity, Source};
use tracing::debug;

use super::CrossCheck;
use crate::config::ValidationConfig;
use crate::patterns::{chars_before, PLANNING_HORIZON, TARGET_YEAR};

/// Characters before a target year searched for a qualifying "规划"
const QUALIFIER_WINDOW: usize = 5;

pub struct HorizonCheck;

impl CrossCheck for HorizonCheck {
    fn name(&self) -> &'static str {
        "horizon"
    }

    fn check(
        &self,
        _indicators: &IndicatorSet,
        model: &DocumentModel,
        _config: &ValidationConfig,
    ) -> Vec<Finding> {
        check_target_years(&model.text_units())
    }
}

/// `(start, end)` years from the first unit that states a planning horizon
pub fn planning_horizon(units: &[Paragraph]) -> Option<(u32, u32)> {
    units.iter().find_map(|unit| {
        let caps = PLANNING_HORIZON.captures(&unit.text)?;
        Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
    })
}

pub fn check_target_years(units: &[Paragraph]) -> Vec<Finding> {
    let (_, end) = match planning_horizon(units) {
        Some(horizon) => horizon,
        None => return Vec::new(),
    };
    debug!(end, "planning horizon found");

    let mut findings = Vec::new();
    for unit in units {
        for caps in TARGET_YEAR.captures_iter(&unit.text) {
            let (whole, year) = match (caps.get(0), caps.get(1).or_else(|| caps.get(2))) {
                (Some(whole), Some(year)) => (whole, year),
                _ => continue,
            };
            let year: u32 = match year.as_str().parse() {
                Ok(y) => y,
                Err(_) => continue,
            };
            if year <= end {
                continue;
            }
            if chars_before(&unit.text, whole.start(), QUALIFIER_WINDOW).contains("规划") {
                continue;
            }
            findings.push(Finding::new(
                unit.index as i64,
                format!(
                    "目标年份 {} 年超出本规划期末（{} 年），请确认是引用上位规划还是本规划目标年份有误",
                    year, end
                ),
                Severity::Suggestion,
                format!("{}年", year),
                Source::Numbers,
            ));
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unit(index: usize, text: &str) -> Paragraph {
        Paragraph {
            index,
            text: text.to_string(),
            style_name: "Normal".to_string(),
            heading_level: 0,
        }
    }

    #[test]
    fn test_year_after_horizon_is_suggested() {
        let units = vec![
            unit(0, "规划期限为2021—2035年。"),
            unit(4, "到2040年建成生态宜居新城。"),
            unit(6, "力争2030年底完成改造。"),
        ];
        let findings = check_target_years(&units);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].paragraph_index, 4);
        assert_eq!(findings[0].matched, "2040年");
        assert_eq!(findings[0].severity, Severity::Suggestion);
    }

    #[test]
    fn test_qualified_long_range_target_is_ignored() {
        let units = vec![
            unit(0, "规划期限：2021年至2035年"),
            unit(1, "总体规划到2050年实现全面发展"),
        ];
        assert!(check_target_years(&units).is_empty());
    }

    #[test]
    fn test_no_horizon_means_no_findings() {
        let units = vec![unit(0, "到2060年实现碳中和")];
        assert_eq!(planning_horizon(&units), None);
        assert!(check_target_years(&units).is_empty());
    }
}
