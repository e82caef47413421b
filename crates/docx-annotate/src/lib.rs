//! Word comment injection
//!
//! Attaches findings to body paragraphs of a `.docx` as review comments.
//! The document part is edited by splicing markup into the original text,
//! so everything outside the annotated paragraphs stays byte-identical.

pub mod comments;
pub mod error;
pub mod locate;
pub mod manifest;
pub mod repack;
pub mod splice;

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use document_extract::package::{
    open_package, read_part, WordTags, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART,
};
use shared_types::Finding;
use tracing::{debug, info};

pub use comments::{CommentRecord, CommentStore};
pub use error::AnnotateError;
pub use locate::{body_paragraphs, ParagraphSpan};

use manifest::{
    comments_part, empty_relationships, ensure_comments_override, ensure_comments_relationship,
    COMMENTS_PART,
};
use splice::AnchorPlan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateOptions {
    pub author: String,
    pub initials: String,
    /// Comment timestamp, now when unset
    pub date: Option<DateTime<Utc>>,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            author: "校对系统".to_string(),
            initials: "AI".to_string(),
            date: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Annotated {
    pub bytes: Vec<u8>,
    /// Comments written
    pub added: usize,
    /// Findings pointing past the last paragraph
    pub skipped: usize,
}

/// Add one comment per finding to the package in `bytes`.
///
/// Findings with a blank comment are ignored. An index below zero anchors to
/// the first paragraph; an index past the last paragraph is skipped.
pub fn inject_comments(
    bytes: &[u8],
    findings: &[Finding],
    options: &AnnotateOptions,
) -> Result<Annotated, AnnotateError> {
    let mut archive = open_package(bytes)?;
    let document = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| AnnotateError::MissingPart(DOCUMENT_PART.to_string()))?;
    let tags = WordTags::detect(&document)?;
    let spans = body_paragraphs(&document, &tags)?;

    let rels = read_part(&mut archive, DOCUMENT_RELS_PART)?;
    let store_part = match rels.as_deref() {
        Some(xml) => comments_part(xml)?,
        None => None,
    }
    .unwrap_or_else(|| COMMENTS_PART.to_string());

    let (mut store, store_exists) = match read_part(&mut archive, &store_part)? {
        Some(xml) => (CommentStore::parse(&xml)?, true),
        None => (CommentStore::empty(), false),
    };

    let date = options
        .date
        .unwrap_or_else(Utc::now)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string();

    let mut plan = AnchorPlan::new(&document, &tags, &spans);
    let mut records = Vec::new();
    let mut skipped = 0;

    for finding in findings {
        let text = finding.comment.trim();
        if text.is_empty() {
            continue;
        }
        let index = finding.paragraph_index.max(0) as usize;
        if index >= spans.len() {
            debug!(
                para_index = finding.paragraph_index,
                paragraphs = spans.len(),
                "finding points past the last paragraph, skipping"
            );
            skipped += 1;
            continue;
        }

        let id = store.allocate();
        plan.anchor(index, id);
        records.push(CommentRecord {
            id,
            author: options.author.clone(),
            initials: options.initials.clone(),
            date: date.clone(),
            text: format!("{} {}", finding.severity.tag(), text),
        });
    }

    if records.is_empty() {
        info!(skipped, "no comments to add, package left unchanged");
        return Ok(Annotated {
            bytes: bytes.to_vec(),
            added: 0,
            skipped,
        });
    }

    let mut replaced = HashMap::new();
    let mut appended = Vec::new();
    replaced.insert(DOCUMENT_PART.to_string(), plan.apply());

    let store_xml = store.render(&records)?;
    if store_exists {
        replaced.insert(store_part.clone(), store_xml);
    } else {
        appended.push((store_part.clone(), store_xml));
    }

    match rels {
        Some(rels) => {
            if let Some(updated) = ensure_comments_relationship(&rels)? {
                replaced.insert(DOCUMENT_RELS_PART.to_string(), updated);
            }
        }
        None => {
            if let Some(created) = ensure_comments_relationship(&empty_relationships())? {
                appended.push((DOCUMENT_RELS_PART.to_string(), created));
            }
        }
    }

    let content_types = read_part(&mut archive, CONTENT_TYPES_PART)?
        .ok_or_else(|| AnnotateError::MissingPart(CONTENT_TYPES_PART.to_string()))?;
    if let Some(updated) = ensure_comments_override(&content_types, &store_part)? {
        replaced.insert(CONTENT_TYPES_PART.to_string(), updated);
    }

    let added = records.len();
    info!(added, skipped, paragraphs = spans.len(), "comments injected");
    Ok(Annotated {
        bytes: repack::repack(bytes, &replaced, &appended)?,
        added,
        skipped,
    })
}

/// Annotate `input` into `output`, leaving `input` untouched.
///
/// The result is written to a temporary file next to `output` and renamed
/// into place once complete.
pub fn annotate_file<P, Q>(
    input: P,
    findings: &[Finding],
    output: Q,
    options: &AnnotateOptions,
) -> Result<Annotated, AnnotateError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output = output.as_ref();
    let bytes = std::fs::read(input)?;
    let annotated = inject_comments(&bytes, findings, options)?;

    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(&annotated.bytes)?;
    file.flush()?;
    file.persist(output)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        added = annotated.added,
        "wrote annotated document"
    );
    Ok(annotated)
}
