//! Sequential chunk-by-chunk review of a whole document

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared_types::{dedup_findings, DocumentModel, Finding, IndicatorSet};
use tracing::{debug, info, warn};

use crate::chunk::{split_paragraphs, Chunk};
use crate::prompt::{ChunkPrompt, PromptLimits};
use crate::response::{parse_response, ReviewResponse};
use crate::reviewer::{ReferenceRules, Reviewer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Character budget per chunk
    pub chunk_char_limit: usize,
    /// Character budget of the paragraph excerpt inside one prompt
    pub excerpt_char_limit: usize,
    pub max_tables: usize,
    pub max_table_rows: usize,
    pub max_known_issues: usize,
    pub max_indicators_per_category: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            chunk_char_limit: 4000,
            excerpt_char_limit: 40_000,
            max_tables: 3,
            max_table_rows: 10,
            max_known_issues: 30,
            max_indicators_per_category: 10,
        }
    }
}

impl ReviewConfig {
    fn prompt_limits(&self) -> PromptLimits {
        PromptLimits {
            excerpt_chars: self.excerpt_char_limit,
            max_tables: self.max_tables,
            max_table_rows: self.max_table_rows,
            max_known_issues: self.max_known_issues,
            max_indicators_per_category: self.max_indicators_per_category,
        }
    }
}

/// Inputs of one review run
pub struct ReviewRequest<'a> {
    pub model: &'a DocumentModel,
    pub indicators: &'a IndicatorSet,
    /// Findings already produced by rules, passed as "do not repeat" hints
    pub known_issues: &'a [Finding],
    pub reference_rules: &'a ReferenceRules,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub findings: Vec<Finding>,
    pub summary: String,
    pub chunks_reviewed: usize,
    pub unparseable_chunks: usize,
}

/// Review a document chunk by chunk, one reviewer call at a time.
///
/// A reply that cannot be parsed contributes nothing and the run goes on. A
/// reviewer error aborts the run and is returned with the failing chunk
/// position attached.
pub fn review_document<R>(
    request: &ReviewRequest<'_>,
    config: &ReviewConfig,
    reviewer: &mut R,
) -> anyhow::Result<ReviewOutcome>
where
    R: Reviewer + ?Sized,
{
    let units = request.model.text_units();
    let mut chunks = split_paragraphs(&units, config.chunk_char_limit);
    if chunks.is_empty() {
        // Tables still deserve a look when there is no body text
        chunks.push(Chunk::default());
    }

    let total = chunks.len();
    let limits = config.prompt_limits();
    info!(chunks = total, paragraphs = units.len(), "starting chunked review");

    let mut outcome = ReviewOutcome::default();
    let mut findings = Vec::new();

    for (i, chunk) in chunks.iter().enumerate() {
        let position = i + 1;
        let prompt = ChunkPrompt {
            chunk,
            position,
            total,
            tables: request.model.tables(),
            known_issues: request.known_issues,
            indicators: request.indicators,
            reference_rules: request.reference_rules.as_str(),
        }
        .render(&limits);

        debug!(position, prompt_chars = prompt.chars().count(), "sending chunk");
        let raw = reviewer
            .review(&prompt)
            .with_context(|| format!("reviewer failed on chunk {}/{}", position, total))?;
        outcome.chunks_reviewed += 1;

        match parse_response(&raw) {
            ReviewResponse::Parsed { summary, issues } => {
                debug!(position, issues = issues.len(), "chunk reviewed");
                findings.extend(issues);
                if !summary.is_empty() {
                    outcome.summary = summary;
                }
            }
            ReviewResponse::Unparseable => {
                warn!(position, "reviewer reply was not valid JSON, skipping chunk");
                outcome.unparseable_chunks += 1;
            }
        }
    }

    outcome.findings = dedup_findings(findings);
    info!(
        findings = outcome.findings.len(),
        unparseable = outcome.unparseable_chunks,
        "chunked review complete"
    );
    Ok(outcome)
}
