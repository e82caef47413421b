//! Document model extraction
//!
//! Turns a `.docx` package into ordered paragraphs and tables with stable
//! positional indices, or a `.pdf` into page text. Word documents also carry
//! the first line of each section's header and footer.

pub mod docx;
pub mod error;
pub mod package;
pub mod pdf;
pub mod sections;
pub mod styles;

use std::path::Path;

use shared_types::DocumentModel;
use tracing::info;

pub use docx::{extract_docx, parse_document_xml, parse_story_xml};
pub use error::ExtractError;
pub use pdf::extract_pdf;
pub use sections::{section_refs, SectionRefs, SectionTexts};
pub use styles::{heading_level, StyleSheet};

/// Supported input container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Docx,
    Pdf,
}

impl InputFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "docx" => Ok(InputFormat::Docx),
            "pdf" => Ok(InputFormat::Pdf),
            _ => Err(ExtractError::UnsupportedFormat(format!(".{}", ext))),
        }
    }
}

/// Extract a document model from bytes of a known format
pub fn extract_bytes(bytes: &[u8], format: InputFormat) -> Result<DocumentModel, ExtractError> {
    match format {
        InputFormat::Docx => extract_docx(bytes),
        InputFormat::Pdf => extract_pdf(bytes),
    }
}

/// Read and extract a document from disk
pub fn extract_path<P: AsRef<Path>>(path: P) -> Result<DocumentModel, ExtractError> {
    let path = path.as_ref();
    let format = InputFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    info!(path = %path.display(), ?format, "extracting document");
    extract_bytes(&bytes, format)
}
