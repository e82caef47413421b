//! Markdown proofreading report

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use shared_types::{Finding, Paragraph, Severity};

/// Characters of a heading shown for the heading itself
const HEADING_PREVIEW: usize = 30;
const SECTION_PREVIEW: usize = 20;
const PARENT_PREVIEW: usize = 15;

fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Human-readable position of every paragraph, keyed by paragraph index.
///
/// Body paragraphs are described by their enclosing heading (and its parent
/// heading) plus their ordinal within that section.
pub fn location_map(paragraphs: &[Paragraph]) -> HashMap<i64, String> {
    let mut map = HashMap::new();
    let mut headings: BTreeMap<u8, String> = BTreeMap::new();
    let mut body_count = 0usize;

    for para in paragraphs {
        let index = para.index as i64;
        let level = para.heading_level;
        if level > 0 {
            headings.retain(|l, _| *l < level);
            headings.insert(level, para.text.clone());
            body_count = 0;
            map.insert(
                index,
                format!("「{}」（章节标题）", preview(&para.text, HEADING_PREVIEW)),
            );
            continue;
        }

        body_count += 1;
        let location = match headings.iter().next_back() {
            Some((deepest, section)) => {
                let section = preview(section, SECTION_PREVIEW);
                let parent = deepest
                    .checked_sub(1)
                    .filter(|l| *l >= 1)
                    .and_then(|l| headings.get(&l));
                match parent {
                    Some(parent) => format!(
                        "「{} · {}」第{}段",
                        preview(parent, PARENT_PREVIEW),
                        section,
                        body_count
                    ),
                    None => format!("「{}」第{}段", section, body_count),
                }
            }
            None => format!("开篇第{}段", body_count),
        };
        map.insert(index, location);
    }
    map
}

/// Counts of findings per producer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub rule: usize,
    pub numbers: usize,
    pub ai: usize,
}

pub struct ReportInput<'a> {
    /// Document name shown in the title
    pub name: &'a str,
    pub paragraphs: &'a [Paragraph],
    pub findings: &'a [Finding],
    pub counts: SourceCounts,
    /// Overall assessment from the reviewer
    pub summary: &'a str,
    pub reviewed: bool,
    pub date: NaiveDate,
}

fn cell(text: &str) -> String {
    text.replace('|', "｜").replace('\n', " ")
}

fn severity_section(
    lines: &mut Vec<String>,
    title: &str,
    empty: &str,
    items: &[&Finding],
    locations: &HashMap<i64, String>,
) {
    lines.push(format!("## {}", title));
    lines.push(String::new());
    if items.is_empty() {
        lines.push(empty.to_string());
    } else {
        lines.push("| 位置 | 问题描述 | 匹配文本 |".to_string());
        lines.push("|---|---|---|".to_string());
        for item in items {
            let location = if item.is_located() {
                locations
                    .get(&item.paragraph_index)
                    .cloned()
                    .unwrap_or_else(|| format!("第{}段", item.paragraph_index))
            } else {
                "位置未定位".to_string()
            };
            lines.push(format!(
                "| {} | {} | `{}` |",
                cell(&location),
                cell(&item.comment),
                cell(&item.matched)
            ));
        }
    }
    lines.push(String::new());
}

pub fn render_report(input: &ReportInput<'_>) -> String {
    let of = |severity: Severity| -> Vec<&Finding> {
        input
            .findings
            .iter()
            .filter(|f| f.severity == severity)
            .collect()
    };
    let errors = of(Severity::Error);
    let warnings = of(Severity::Warning);
    let suggestions = of(Severity::Suggestion);
    let notes = of(Severity::Note);

    let method = if input.reviewed {
        "自动检查（错别字 + 格式规则 + 数字校验）+ 分块深度审校"
    } else {
        "自动检查（错别字 + 格式规则 + 数字校验），深度审校未启用"
    };

    let mut breakdown = format!("错别字/格式 {} 项", input.counts.rule);
    if input.counts.numbers > 0 {
        breakdown.push_str(&format!(" + 数字校验 {} 项", input.counts.numbers));
    }
    if input.reviewed {
        breakdown.push_str(&format!(" + 深度审校 {} 项", input.counts.ai));
    }

    let mut lines = vec![
        format!("# 校对报告 — {}", input.name),
        String::new(),
        format!("**校对日期：** {}", input.date.format("%Y年%m月%d日")),
        format!("**生成方式：** {}", method),
        String::new(),
        "---".to_string(),
        String::new(),
        "## 总体评估".to_string(),
        String::new(),
    ];
    if !input.summary.is_empty() {
        lines.push(format!("> {}", input.summary));
        lines.push(String::new());
    }
    lines.extend([
        format!(
            "共发现 **{}** 项潜在问题（{}）：",
            input.findings.len(),
            breakdown
        ),
        String::new(),
        "| 问题级别 | 数量 |".to_string(),
        "|---|---|".to_string(),
        format!("| 错误（必须修改） | {} 项 |", errors.len()),
        format!("| 警告（建议修改） | {} 项 |", warnings.len()),
        format!("| 建议（可考虑）   | {} 项 |", suggestions.len()),
    ]);
    if !notes.is_empty() {
        lines.push(format!("| 备注 | {} 项 |", notes.len()));
    }
    lines.extend([String::new(), "---".to_string(), String::new()]);

    let locations = location_map(input.paragraphs);
    severity_section(&mut lines, "一、错误（必须修改）", "*未检测到错误。*", &errors, &locations);
    lines.extend(["---".to_string(), String::new()]);
    severity_section(&mut lines, "二、警告（建议修改）", "*未检测到警告。*", &warnings, &locations);
    lines.extend(["---".to_string(), String::new()]);
    severity_section(&mut lines, "三、建议（可考虑优化）", "*无额外建议。*", &suggestions, &locations);
    if !notes.is_empty() {
        lines.extend(["---".to_string(), String::new()]);
        severity_section(&mut lines, "四、备注", "", &notes, &locations);
    }

    lines.extend([
        "---".to_string(),
        String::new(),
        "*本报告由规划文件校对工具自动生成，请人工复核后使用。*".to_string(),
    ]);
    lines.join("\n")
}
