//! Table total verification
//!
//! Land-use balance tables list parent categories followed by their
//! breakdowns without marking them, e.g.
//!
//! ```text
//! 住宅组团      16.37
//! 二类住宅      13.65
//! 三类住宅       2.72
//! 基础教育设施   2.54
//! 初级中学       1.01
//! 小学           0.86
//! 幼托           0.67
//! 合计          18.91
//! ```
//!
//! Summing every row would double count, so runs of rows that add up to the
//! row above them are folded into that parent first.

use shared_types::{DocumentModel, Finding, IndicatorSet, Severity, Source, Table};
use tracing::debug;

use super::CrossCheck;
use crate::config::{Tolerance, ValidationConfig};
use crate::extractors::parse_cell_number;
use crate::patterns::{format_number, format_signed, SUB_BREAKDOWN_KEYWORDS, TOTAL_KEYWORDS};

/// Tables need a header, a data row and a total row
const MIN_TABLE_ROWS: usize = 3;

/// Fewer parts than this cannot meaningfully be summed
const MIN_SUMMANDS: usize = 2;

/// A single row equal to the one above it is a repeat, not a breakdown.
/// Zero rows do not count toward this.
const MIN_CHILDREN: usize = 2;

pub struct TableSumCheck;

impl CrossCheck for TableSumCheck {
    fn name(&self) -> &'static str {
        "table_sums"
    }

    fn check(
        &self,
        _indicators: &IndicatorSet,
        model: &DocumentModel,
        config: &ValidationConfig,
    ) -> Vec<Finding> {
        validate_table_sums(model, config)
    }
}

/// Drop values that are nested children of an earlier value.
///
/// Scanning top to bottom, each remaining positive value is a candidate
/// parent. Following values are accumulated until the running sum equals the
/// parent within tolerance over at least two non-zero rows, at which point
/// they are marked as its children, or until it overshoots, at which point the
/// parent has none.
pub fn remove_sub_items(values: &[f64], tolerance: Tolerance) -> Vec<f64> {
    let mut is_child = vec![false; values.len()];

    for i in 0..values.len() {
        let parent = values[i];
        if is_child[i] || parent <= 0.0 {
            continue;
        }
        let tol = tolerance.for_value(parent);
        let mut running = 0.0;
        let mut run_len = 0;

        for j in (i + 1)..values.len() {
            if is_child[j] {
                continue;
            }
            running += values[j];
            if values[j] != 0.0 {
                run_len += 1;
            }
            if run_len >= MIN_CHILDREN && (running - parent).abs() <= tol {
                for flag in &mut is_child[(i + 1)..=j] {
                    *flag = true;
                }
                break;
            }
            if running > parent + tol {
                break;
            }
        }
    }

    values
        .iter()
        .zip(is_child)
        .filter(|(_, child)| !child)
        .map(|(v, _)| *v)
        .collect()
}

fn is_total_label(label: &str) -> bool {
    TOTAL_KEYWORDS.iter().any(|kw| label.contains(kw))
}

fn is_breakdown_label(label: &str) -> bool {
    SUB_BREAKDOWN_KEYWORDS.iter().any(|kw| label.starts_with(kw))
}

fn first_cell(row: &[String]) -> &str {
    row.first().map(|c| c.trim()).unwrap_or("")
}

pub fn validate_table_sums(model: &DocumentModel, config: &ValidationConfig) -> Vec<Finding> {
    model
        .tables()
        .iter()
        .enumerate()
        .flat_map(|(position, table)| {
            check_table(position, table, model.table_anchor(position), config)
        })
        .collect()
}

/// Check every total row of one table against the rows above it
pub fn check_table(
    position: usize,
    table: &Table,
    anchor: i64,
    config: &ValidationConfig,
) -> Vec<Finding> {
    let rows = &table.rows;
    if rows.len() < MIN_TABLE_ROWS {
        return Vec::new();
    }

    let mut findings = Vec::new();
    for (row_i, row) in rows.iter().enumerate() {
        let label = first_cell(row);
        if !is_total_label(label) {
            continue;
        }

        for (col_j, stated_cell) in row.iter().enumerate().skip(1) {
            let stated = match parse_cell_number(stated_cell) {
                Some(v) if v != 0.0 => v,
                _ => continue,
            };

            let column: Vec<f64> = rows
                .get(1..row_i)
                .unwrap_or_default()
                .iter()
                .filter(|data| !data.is_empty() && !is_breakdown_label(first_cell(data)))
                .filter_map(|data| data.get(col_j).and_then(|c| parse_cell_number(c)))
                .collect();
            if column.len() < MIN_SUMMANDS {
                continue;
            }

            let top_level = remove_sub_items(&column, config.subitem_tolerance);
            if top_level.len() < MIN_SUMMANDS {
                continue;
            }

            let computed: f64 = top_level.iter().sum();
            let diff = computed - stated;
            if diff.abs() <= config.total_tolerance.for_value(stated) {
                continue;
            }

            debug!(table = position, row = row_i, column = col_j, computed, stated, "table total mismatch");
            findings.push(Finding::new(
                anchor,
                format!(
                    "第 {} 张表格「{}」行第 {} 列：分项之和 {} 与合计值 {} 不一致（差值 {}），请核查数据",
                    position + 1,
                    label,
                    col_j + 1,
                    format_number(computed),
                    format_number(stated),
                    format_signed(diff)
                ),
                Severity::Error,
                stated_cell.trim(),
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
    use proptest::prelude::*;

    fn table(rows: &[&[&str]]) -> Table {
        Table {
            index: 0,
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_nested_breakdowns_are_removed() {
        let values = [16.37, 13.65, 2.72, 2.54, 1.01, 0.86, 0.67];
        assert_eq!(
            remove_sub_items(&values, Tolerance::default()),
            vec![16.37, 2.54]
        );
    }

    #[test]
    fn test_equal_neighbour_is_not_a_breakdown() {
        assert_eq!(remove_sub_items(&[10.0, 10.0], Tolerance::default()), vec![10.0, 10.0]);
    }

    #[test]
    fn test_zero_row_does_not_complete_a_breakdown() {
        assert_eq!(
            remove_sub_items(&[3.0, 3.0, 0.0], Tolerance::default()),
            vec![3.0, 3.0, 0.0]
        );
        assert_eq!(
            remove_sub_items(&[3.0, 0.0, 3.0], Tolerance::default()),
            vec![3.0, 0.0, 3.0]
        );
    }

    #[test]
    fn test_zero_row_in_table_keeps_total_consistent() {
        let t = table(&[
            &["用地", "面积"],
            &["A", "3"],
            &["B", "3"],
            &["C", "0"],
            &["合计", "6"],
        ]);
        assert!(check_table(0, &t, 0, &ValidationConfig::default()).is_empty());
    }

    #[test]
    fn test_total_in_header_row_is_ignored() {
        let t = table(&[&["合计", "5"], &["a", "1"], &["b", "2"]]);
        assert!(check_table(0, &t, 0, &ValidationConfig::default()).is_empty());
    }

    #[test]
    fn test_unrelated_values_are_kept() {
        let values = [5.0, 3.0, 4.0];
        assert_eq!(remove_sub_items(&values, Tolerance::default()), vec![5.0, 3.0, 4.0]);
    }

    #[test]
    fn test_mismatched_total_reports_signed_difference() {
        let t = table(&[&["用地", "面积"], &["居住", "10"], &["绿地", "10"], &["合计", "25"]]);
        let findings = check_table(0, &t, 6, &ValidationConfig::default());

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.severity, Severity::Error);
        assert_eq!(finding.paragraph_index, 6);
        assert_eq!(finding.matched, "25");
        assert_eq!(finding.source, Source::Numbers);
        assert!(finding.comment.contains("第 1 张表格「合计」行第 2 列"));
        assert!(finding.comment.contains("分项之和 20 与合计值 25"));
        assert!(finding.comment.contains("差值 -5"));
    }

    #[test]
    fn test_matching_total_within_rounding_passes() {
        let t = table(&[
            &["用地", "面积（公顷）", "比例"],
            &["居住用地", "12.34", "61.7%"],
            &["绿地", "7.71", "38.6%"],
            &["合计", "20.00", "100%"],
        ]);
        assert!(check_table(0, &t, 0, &ValidationConfig::default()).is_empty());
    }

    #[test]
    fn test_breakdown_rows_are_skipped() {
        let t = table(&[
            &["类别", "数量"],
            &["学校", "4"],
            &["其中：小学", "3"],
            &["医院", "2"],
            &["合计", "6"],
        ]);
        assert!(check_table(0, &t, 0, &ValidationConfig::default()).is_empty());
    }

    #[test]
    fn test_short_tables_and_zero_totals_are_ignored() {
        let short = table(&[&["居住", "10"], &["合计", "25"]]);
        assert!(check_table(0, &short, 0, &ValidationConfig::default()).is_empty());

        let zero = table(&[&["项", "值"], &["a", "1"], &["b", "2"], &["合计", "0"]]);
        assert!(check_table(0, &zero, 0, &ValidationConfig::default()).is_empty());
    }

    #[test]
    fn test_unanchored_table_reports_sentinel() {
        let model = DocumentModel::Structured {
            paragraphs: vec![],
            tables: vec![table(&[&["项", "值"], &["a", "10"], &["b", "10"], &["总计", "25"]])],
            table_positions: Default::default(),
            headers: vec![],
            footers: vec![],
        };
        let findings = validate_table_sums(&model, &ValidationConfig::default());
        assert_eq!(findings[0].paragraph_index, -1);
    }

    proptest! {
        /// Elimination only removes values and never reorders survivors
        #[test]
        fn elimination_keeps_an_ordered_subsequence(values in prop::collection::vec(0.0f64..100.0, 0..12)) {
            let kept = remove_sub_items(&values, Tolerance::default());
            prop_assert!(kept.len() <= values.len());
            let mut rest = values.iter();
            for v in &kept {
                prop_assert!(rest.any(|x| x == v));
            }
        }

        /// Trailing zero rows are kept and never change the earlier result
        #[test]
        fn trailing_zeros_do_not_change_elimination(
            values in prop::collection::vec(0.0f64..100.0, 0..12),
            zeros in 1usize..4,
        ) {
            let mut padded = values.clone();
            padded.extend(std::iter::repeat(0.0).take(zeros));
            let mut expected = remove_sub_items(&values, Tolerance::default());
            expected.extend(std::iter::repeat(0.0).take(zeros));
            prop_assert_eq!(remove_sub_items(&padded, Tolerance::default()), expected);
        }

        /// The first value is never anyone's child
        #[test]
        fn first_value_survives(values in prop::collection::vec(0.0f64..100.0, 1..12)) {
            let kept = remove_sub_items(&values, Tolerance::default());
            prop_assert_eq!(kept.first(), values.first());
        }
    }
}
