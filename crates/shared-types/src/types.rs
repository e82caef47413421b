use std::collections::BTreeMap;

/// Marker stored in `table_positions` when a table has no preceding paragraph
pub const NO_PRECEDING_PARAGRAPH: i64 = -1;

/// Table index -> ordinal of the body paragraph right before the table
pub type TablePositions = BTreeMap<usize, i64>;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Paragraph {
    pub index: usize, // Ordinal among body-level paragraph elements
    pub text: String,
    pub style_name: String,
    pub heading_level: u8, // 0 = body text
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    pub index: usize,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Page {
    pub number: u32, // 1-based
    pub text: String,
}

/// Extracted document, either paragraph-native or page-based
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentModel {
    Structured {
        paragraphs: Vec<Paragraph>,
        tables: Vec<Table>,
        table_positions: TablePositions,
        /// First paragraph of each section's primary header, when not blank
        #[serde(default)]
        headers: Vec<String>,
        #[serde(default)]
        footers: Vec<String>,
    },
    FlatText {
        pages: Vec<Page>,
        full_text: String,
    },
}

impl DocumentModel {
    /// Paragraphs of a structured document; empty for page-based documents
    pub fn paragraphs(&self) -> &[Paragraph] {
        match self {
            DocumentModel::Structured { paragraphs, .. } => paragraphs,
            DocumentModel::FlatText { .. } => &[],
        }
    }

    pub fn tables(&self) -> &[Table] {
        match self {
            DocumentModel::Structured { tables, .. } => tables,
            DocumentModel::FlatText { .. } => &[],
        }
    }

    pub fn headers(&self) -> &[String] {
        match self {
            DocumentModel::Structured { headers, .. } => headers,
            DocumentModel::FlatText { .. } => &[],
        }
    }

    pub fn footers(&self) -> &[String] {
        match self {
            DocumentModel::Structured { footers, .. } => footers,
            DocumentModel::FlatText { .. } => &[],
        }
    }

    /// Paragraph preceding table `table_index`, or -1 when unknown
    pub fn table_anchor(&self, table_index: usize) -> i64 {
        match self {
            DocumentModel::Structured {
                table_positions, ..
            } => table_positions
                .get(&table_index)
                .copied()
                .unwrap_or(NO_PRECEDING_PARAGRAPH),
            DocumentModel::FlatText { .. } => NO_PRECEDING_PARAGRAPH,
        }
    }

    /// Indexed text units: real paragraphs, or one pseudo-paragraph per page.
    ///
    /// Page-based documents use the 0-based page ordinal as the index so that
    /// downstream stages can treat both shapes the same way.
    pub fn text_units(&self) -> Vec<Paragraph> {
        match self {
            DocumentModel::Structured { paragraphs, .. } => paragraphs.clone(),
            DocumentModel::FlatText { pages, .. } => pages
                .iter()
                .enumerate()
                .map(|(i, page)| Paragraph {
                    index: i,
                    text: page.text.clone(),
                    style_name: String::new(),
                    heading_level: 0,
                })
                .collect(),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, DocumentModel::Structured { .. })
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    Area,
    Ratio,
    Year,
    Population,
    Other,
}

impl IndicatorCategory {
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorCategory::Area => "areas",
            IndicatorCategory::Ratio => "ratios",
            IndicatorCategory::Year => "years",
            IndicatorCategory::Population => "populations",
            IndicatorCategory::Other => "others",
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum IndicatorValue {
    Number(f64),
    Raw(String),
}

impl IndicatorValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            IndicatorValue::Number(n) => Some(*n),
            IndicatorValue::Raw(_) => None,
        }
    }

    /// Stable key used for deduplication (floats are not `Eq`)
    pub fn dedup_key(&self) -> String {
        match self {
            IndicatorValue::Number(n) => format!("n:{}", n),
            IndicatorValue::Raw(s) => format!("s:{}", s),
        }
    }
}

impl std::fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndicatorValue::Number(n) => write!(f, "{}", n),
            IndicatorValue::Raw(s) => f.write_str(s),
        }
    }
}

/// One matched planning metric with its surrounding text
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Indicator {
    pub category: IndicatorCategory,
    pub value: IndicatorValue,
    pub matched: String,
    pub context: String,
    pub paragraph: Option<usize>, // None for table cells
}

/// Indicators grouped by category, in extraction order
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct IndicatorSet {
    by_category: BTreeMap<IndicatorCategory, Vec<Indicator>>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, indicator: Indicator) {
        self.by_category
            .entry(indicator.category)
            .or_default()
            .push(indicator);
    }

    pub fn extend(&mut self, other: IndicatorSet) {
        for (category, items) in other.by_category {
            self.by_category.entry(category).or_default().extend(items);
        }
    }

    pub fn by_category(&self, category: IndicatorCategory) -> &[Indicator] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn categories(&self) -> impl Iterator<Item = (IndicatorCategory, &[Indicator])> {
        self.by_category
            .iter()
            .map(|(category, items)| (*category, items.as_slice()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Indicator> {
        self.by_category.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
