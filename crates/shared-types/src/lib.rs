pub mod finding;
pub mod types;

pub use finding::{dedup_findings, Finding, Severity, Source};
pub use types::{
    DocumentModel, Indicator, IndicatorCategory, IndicatorSet, IndicatorValue, Page, Paragraph,
    Table, TablePositions, NO_PRECEDING_PARAGRAPH,
};
