// Numeric indicator extraction for planning documents
use std::collections::HashSet;

use shared_types::{DocumentModel, Indicator, IndicatorSet, IndicatorValue};

use crate::patterns::{
    context_window, CELL_NUMBER, CELL_SEPARATORS, CELL_UNIT_SUFFIXES, CONTEXT_RADIUS,
    NUMERIC_PATTERNS,
};

/// Scan one text unit for indicator matches.
///
/// Lines are scanned independently so a context window never spans a line
/// break. Within the unit, each category keeps only the first occurrence of
/// a given value.
pub fn find_in_text(text: &str, paragraph: Option<usize>) -> IndicatorSet {
    let mut found = IndicatorSet::new();
    let mut seen = HashSet::new();

    for line in text.split('\n') {
        for (category, pattern) in NUMERIC_PATTERNS.iter() {
            for caps in pattern.captures_iter(line) {
                let whole = match caps.get(0) {
                    Some(m) => m,
                    None => continue,
                };
                let raw = caps.get(1).map_or(whole.as_str(), |g| g.as_str());
                let value = match raw.parse::<f64>() {
                    Ok(n) => IndicatorValue::Number(n),
                    Err(_) => IndicatorValue::Raw(raw.to_string()),
                };

                if !seen.insert((*category, value.dedup_key())) {
                    continue;
                }

                found.push(Indicator {
                    category: *category,
                    value,
                    matched: whole.as_str().to_string(),
                    context: context_window(line, whole.start(), whole.end(), CONTEXT_RADIUS)
                        .to_string(),
                    paragraph,
                });
            }
        }
    }

    found
}

/// Collect indicators from every text unit, then from every table cell
pub fn extract_indicators(model: &DocumentModel) -> IndicatorSet {
    let mut all = IndicatorSet::new();

    for unit in model.text_units() {
        all.extend(find_in_text(&unit.text, Some(unit.index)));
    }

    for table in model.tables() {
        for cell in table.rows.iter().flatten() {
            all.extend(find_in_text(cell, None));
        }
    }

    all
}

/// Parse a table cell as a number, tolerating separators and unit suffixes.
///
/// Returns `None` for anything that is not a plain decimal once cleaned.
pub fn parse_cell_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| !c.is_whitespace() && !CELL_SEPARATORS.contains(c))
        .collect();

    let mut rest = cleaned.as_str();
    while let Some(unit) = CELL_UNIT_SUFFIXES.iter().find(|u| rest.ends_with(*u)) {
        rest = &rest[..rest.len() - unit.len()];
    }

    if !CELL_NUMBER.is_match(rest) {
        return None;
    }
    rest.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::{IndicatorCategory, Paragraph, Table, TablePositions};

    #[test]
    fn test_finds_area_ratio_year_population() {
        let text = "规划用地面积12.5公顷，容积率为1.8，至2035年人口为3.2万";
        let found = find_in_text(text, Some(4));

        let areas = found.by_category(IndicatorCategory::Area);
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].value, IndicatorValue::Number(12.5));
        assert_eq!(areas[0].paragraph, Some(4));

        let ratios = found.by_category(IndicatorCategory::Ratio);
        assert_eq!(ratios[0].matched, "容积率为1.8");
        assert_eq!(found.by_category(IndicatorCategory::Year)[0].value.to_string(), "2035");
        assert!(found
            .by_category(IndicatorCategory::Population)
            .iter()
            .any(|i| i.value == IndicatorValue::Number(3.2)));
    }

    #[test]
    fn test_duplicate_values_within_a_unit_are_collapsed() {
        let found = find_in_text("2035年目标；2035年愿景；2050年远景", Some(0));
        let years: Vec<_> = found
            .by_category(IndicatorCategory::Year)
            .iter()
            .map(|i| i.value.to_string())
            .collect();
        assert_eq!(years, vec!["2035", "2050"]);
    }

    #[test]
    fn test_context_stays_on_its_line() {
        let found = find_in_text("第一行说明文字\n绿地率为35%\n第三行", Some(2));
        let ratio = &found.by_category(IndicatorCategory::Ratio)[0];
        assert_eq!(ratio.context, "绿地率为35%");
    }

    #[test]
    fn test_extract_indicators_covers_tables() {
        let model = DocumentModel::Structured {
            paragraphs: vec![Paragraph {
                index: 0,
                text: "总用地20公顷".to_string(),
                style_name: "Normal".to_string(),
                heading_level: 0,
            }],
            tables: vec![Table {
                index: 0,
                rows: vec![vec!["绿地".to_string(), "7.34公顷".to_string()]],
            }],
            table_positions: TablePositions::new(),
            headers: vec![],
            footers: vec![],
        };

        let set = extract_indicators(&model);
        let areas = set.by_category(IndicatorCategory::Area);
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].paragraph, Some(0));
        assert_eq!(areas[1].paragraph, None);
    }

    #[test]
    fn test_parse_cell_number() {
        assert_eq!(parse_cell_number(" 1,234.5 "), Some(1234.5));
        assert_eq!(parse_cell_number("12.5公顷"), Some(12.5));
        assert_eq!(parse_cell_number("35％"), Some(35.0));
        assert_eq!(parse_cell_number("3.2万人"), Some(3.2));
        assert_eq!(parse_cell_number("4hm²"), Some(4.0));
        assert_eq!(parse_cell_number("-0.40"), Some(-0.4));
        assert_eq!(parse_cell_number("１　２"), None);
        assert_eq!(parse_cell_number("—"), None);
        assert_eq!(parse_cell_number(""), None);
        assert_eq!(parse_cell_number("约20"), None);
    }
}
