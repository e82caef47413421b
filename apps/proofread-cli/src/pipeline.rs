//! End-to-end proofreading run
//!
//! extract → rule checks → cross-validation → chunked review → merge →
//! Markdown report → annotated `.docx`. Intermediate results are written as
//! JSON under `<output>/temp/`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use docx_annotate::{annotate_file, AnnotateOptions};
use document_extract::{extract_path, InputFormat};
use review_core::{review_document, ReferenceRules, ReviewRequest, Reviewer};
use serde::{Deserialize, Serialize};
use shared_types::{dedup_findings, Finding, Severity, Source};
use tracing::{info, warn};
use verification_engine::VerificationEngine;

use crate::config::Config;
use crate::report::{render_report, ReportInput, SourceCounts};

pub const REPORT_FILE: &str = "校对报告.md";
pub const TEMP_DIR: &str = "temp";

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Extra findings to merge, in the exchange format
    pub findings_file: Option<PathBuf>,
    /// Report date, today when unset
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub findings: Vec<Finding>,
    pub counts: SourceCounts,
    pub summary: String,
    pub report_path: PathBuf,
    pub annotated_path: Option<PathBuf>,
}

/// One entry of an externally produced finding list
#[derive(Debug, Deserialize)]
struct ExternalFinding {
    #[serde(default = "unlocated")]
    para_index: i64,
    #[serde(default)]
    comment: String,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    matched: String,
    #[serde(default)]
    source: Option<Source>,
}

fn unlocated() -> i64 {
    -1
}

impl From<ExternalFinding> for Finding {
    fn from(item: ExternalFinding) -> Self {
        Finding::new(
            item.para_index,
            item.comment.trim(),
            item.severity
                .as_deref()
                .map_or(Severity::Warning, Severity::from_label),
            item.matched,
            item.source.unwrap_or(Source::Ai),
        )
    }
}

/// Read a JSON array of findings from disk
pub fn load_findings<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Finding>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read findings file: {}", path.display()))?;
    let items: Vec<ExternalFinding> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse findings file: {}", path.display()))?;
    Ok(items.into_iter().map(Finding::from).collect())
}

fn save_temp<T: Serialize>(output_dir: &Path, name: &str, data: &T) -> anyhow::Result<()> {
    let dir = output_dir.join(TEMP_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(data)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Run the whole pipeline; `reviewer` enables the chunked review.
///
/// A failing reviewer is logged and the run continues with rule findings
/// only.
pub fn run_pipeline(
    config: &Config,
    options: &PipelineOptions,
    reviewer: Option<&mut dyn Reviewer>,
) -> anyhow::Result<PipelineResult> {
    let input = &options.input;
    let output_dir = &options.output_dir;
    let format = InputFormat::from_path(input)
        .with_context(|| format!("Unsupported input: {}", input.display()))?;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    info!(input = %input.display(), "reading document");
    let model = extract_path(input)
        .with_context(|| format!("Failed to extract {}", input.display()))?;
    save_temp(output_dir, "doc_content.json", &model)?;

    info!("running rule checks");
    let engine = VerificationEngine::with_config(config.validation.clone());
    let verification = engine.check_document(&model);
    save_temp(output_dir, "numbers.json", &verification.indicators)?;
    save_temp(output_dir, "typos.json", &verification.rule_findings)?;
    save_temp(output_dir, "number_issues.json", &verification.number_findings)?;
    let known_issues = verification.findings();

    let mut summary = String::new();
    let mut reviewed = false;
    let mut ai_findings = Vec::new();
    match reviewer {
        Some(reviewer) => {
            let rules =
                ReferenceRules::load(&config.reviewer.rules, config.reviewer.reference_char_limit);
            let request = ReviewRequest {
                model: &model,
                indicators: &verification.indicators,
                known_issues: &known_issues,
                reference_rules: &rules,
            };
            match review_document(&request, &config.review, reviewer) {
                Ok(outcome) => {
                    reviewed = true;
                    summary = outcome.summary;
                    ai_findings = outcome.findings;
                    save_temp(output_dir, "ai_issues.json", &ai_findings)?;
                }
                Err(e) => warn!(error = %format!("{:#}", e), "review failed, continuing without it"),
            }
        }
        None => info!("no reviewer configured, skipping chunked review"),
    }

    if let Some(path) = &options.findings_file {
        let external = load_findings(path)?;
        info!(count = external.len(), "merging external findings");
        ai_findings.extend(external);
    }

    let counts = SourceCounts {
        rule: verification.rule_findings.len(),
        numbers: verification.number_findings.len(),
        ai: ai_findings.len(),
    };
    let findings = dedup_findings(known_issues.into_iter().chain(ai_findings));
    save_temp(output_dir, "issues.json", &findings)?;

    let name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let units = model.text_units();
    let report = render_report(&ReportInput {
        name: &name,
        paragraphs: &units,
        findings: &findings,
        counts,
        summary: &summary,
        reviewed,
        date: options.date.unwrap_or_else(|| Local::now().date_naive()),
    });
    let report_path = output_dir.join(REPORT_FILE);
    fs::write(&report_path, report)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;

    let mut annotated_path = None;
    if format == InputFormat::Docx && !findings.is_empty() {
        let path = output_dir.join(format!("{}_批注.docx", name));
        let annotate = AnnotateOptions {
            author: config.annotate.author.clone(),
            initials: config.annotate.initials.clone(),
            date: None,
        };
        let annotated = annotate_file(input, &findings, &path, &annotate)
            .with_context(|| format!("Failed to annotate {}", input.display()))?;
        info!(added = annotated.added, path = %path.display(), "annotated document written");
        annotated_path = Some(path);
    }

    info!(findings = findings.len(), "proofreading complete");
    Ok(PipelineResult {
        findings,
        counts,
        summary,
        report_path,
        annotated_path,
    })
}
