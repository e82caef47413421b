//! Static keyword tables and regex patterns for planning documents

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{IndicatorCategory, Severity};

/// Characters of context kept on each side of a numeric match
pub const CONTEXT_RADIUS: usize = 30;

/// First-cell keywords marking a total or subtotal row
pub const TOTAL_KEYWORDS: &[&str] = &["合计", "总计", "小计", "共计", "汇总"];

/// First-cell prefixes marking an explicit sub-breakdown row
pub const SUB_BREAKDOWN_KEYWORDS: &[&str] = &["其中", "含", "包括"];

/// Unit tokens stripped from the end of a table cell before parsing
pub const CELL_UNIT_SUFFIXES: &[&str] = &[
    "平方公里", "平方米", "万人", "万户", "公顷", "km²", "km2", "hm²", "m²", "m2", "ha", "%",
    "％", "万", "亩", "人", "户", "处", "所", "个", "套",
];

/// Characters dropped from table cells before parsing
pub const CELL_SEPARATORS: &[char] = &[',', '，', '\u{3000}'];

/// Ratio indicator -> plausible (min, max)
pub const RATIO_RANGES: &[(&str, f64, f64)] = &[
    ("容积率", 0.1, 8.0),
    ("建筑密度", 5.0, 80.0),
    ("绿地率", 5.0, 70.0),
];

/// Characters that make a doubled word a legitimate distributive form
pub const REDUPLICATION_GUARDS: &[char] = &['一', '各', '每'];

/// Preferred term, variants seen in drafts, note for the reviewer
pub const TERMINOLOGY: &[(&str, &[&str], &str)] = &[
    (
        "控制性详细规划",
        &["控制性规划", "控规详细规划"],
        "全称应为「控制性详细规划」",
    ),
    (
        "基础教育设施",
        &["基础教育设备", "教育基础设施"],
        "规范术语为「基础教育设施」",
    ),
    (
        "建筑密度",
        &["建蔽率", "建筑覆盖率"],
        "控规指标用「建筑密度」",
    ),
    (
        "绿地率",
        &["绿化率", "绿化覆盖率"],
        "规划指标用「绿地率」而非「绿化率」",
    ),
];

lazy_static! {
    /// Indicator patterns in scan order; group 1 is the value
    pub static ref NUMERIC_PATTERNS: Vec<(IndicatorCategory, Regex)> = vec![
        (IndicatorCategory::Area, Regex::new(r"(\d+(?:\.\d+)?)\s*(?:平方公里|km²|km2)").unwrap()),
        (IndicatorCategory::Area, Regex::new(r"(\d+(?:\.\d+)?)\s*(?:公顷|hm²|ha)").unwrap()),
        (IndicatorCategory::Area, Regex::new(r"(\d+(?:\.\d+)?)\s*(?:平方米|m²|m2)").unwrap()),
        (IndicatorCategory::Area, Regex::new(r"(\d+(?:\.\d+)?)\s*亩").unwrap()),
        (IndicatorCategory::Ratio, Regex::new(r"容积率[为是：:]\s*(\d+(?:\.\d+)?)").unwrap()),
        (IndicatorCategory::Ratio, Regex::new(r"建筑密度[为是：:]\s*(\d+(?:\.\d+)?)\s*%?").unwrap()),
        (IndicatorCategory::Ratio, Regex::new(r"绿地率[为是：:]\s*(\d+(?:\.\d+)?)\s*%?").unwrap()),
        (IndicatorCategory::Ratio, Regex::new(r"(\d+(?:\.\d+)?)\s*%.*?(?:绿地率|建筑密度|容积率)").unwrap()),
        (IndicatorCategory::Year, Regex::new(r"(20[0-9]{2})\s*年").unwrap()),
        (IndicatorCategory::Year, Regex::new(r"(19[0-9]{2})\s*年").unwrap()),
        (IndicatorCategory::Population, Regex::new(r"(\d+(?:\.\d+)?)\s*(?:万人|万户|万)").unwrap()),
        (IndicatorCategory::Population, Regex::new(r"人口[为是：:]\s*(\d+(?:\.\d+)?)\s*万").unwrap()),
    ];

    pub static ref PLANNING_HORIZON: Regex =
        Regex::new(r"规划期限[为是：:]{0,2}\s*(\d{4})[年\-—~～至到]+(\d{4})年").unwrap();

    pub static ref TARGET_YEAR: Regex =
        Regex::new(r"到\s*(20\d{2})\s*年|(20\d{2})\s*年(?:底|末|前|实现|达到|完成)").unwrap();

    pub static ref CELL_NUMBER: Regex = Regex::new(r"^-?\d+(?:\.\d+)?$").unwrap();

    /// Regex-expressible format rules: pattern, message, severity
    pub static ref FORMAT_RULES: Vec<(Regex, &'static str, Severity)> = vec![
        (
            Regex::new(r"（\d{4}[-—–]\d{4}）年").unwrap(),
            "年份区间括号格式错误：「（XXXX-XXXX）年」应改为「（XXXX—XXXX年）」",
            Severity::Suggestion,
        ),
        (
            Regex::new(r"\d\s+%").unwrap(),
            "百分号前有多余空格，建议删除",
            Severity::Suggestion,
        ),
        (
            Regex::new(concat!(
                r"一下(?:问题|内容|情况|原则|要求|措施|做法|分析|规定|规范|标准|",
                r"方面|规划|建议|说明|所述|情形|几种|几点|几个|几条|几类|几项|事项|",
                r"指标|目标|任务|重点|方向|基础|依据|政策)"
            ))
            .unwrap(),
            "疑似错别字：「一下」应为「以下」",
            Severity::Error,
        ),
    ];
}

pub const REPEATED_WORD_MESSAGE: &str = "疑似重复词语，请核查是否为笔误";

/// Basic CJK unified ideographs range used by the repeated-word rule
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Slice of `line` around the byte span `start..end`, widened by `radius`
/// characters on each side and trimmed
pub fn context_window(line: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = if radius == 0 {
        start
    } else {
        line[..start]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map(|(i, _)| i)
            .unwrap_or(0)
    };
    let to = line[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(line.len());
    line[from..to].trim()
}

/// The last `count` characters of `text` before byte offset `pos`
pub fn chars_before(text: &str, pos: usize, count: usize) -> &str {
    let from = text[..pos]
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(pos);
    &text[from..pos]
}

/// Render a number for messages: at most four decimals, no trailing zeros
pub fn format_number(value: f64) -> String {
    let s = format!("{:.4}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Same as [`format_number`] with an explicit sign for positive values
pub fn format_signed(value: f64) -> String {
    let s = format_number(value);
    if value > 0.0 && s != "0" {
        format!("+{}", s)
    } else {
        s
    }
}
