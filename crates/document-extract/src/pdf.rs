//! PDF text extraction
//!
//! PDFs carry no paragraph structure we can anchor comments to, so they are
//! returned as page text plus the concatenated full text.

use pdf_extract::extract_text_from_mem;
use shared_types::{DocumentModel, Page};
use tracing::{debug, warn};

use crate::error::ExtractError;

/// Extract per-page text from PDF bytes
pub fn extract_pdf(pdf_bytes: &[u8]) -> Result<DocumentModel, ExtractError> {
    let raw_text = match extract_text_from_mem(pdf_bytes) {
        Ok(text) => text,
        Err(e) => {
            let error_msg = e.to_string().to_lowercase();
            if error_msg.contains("encrypted") || error_msg.contains("password") {
                return Err(ExtractError::PasswordProtected);
            }
            return Err(ExtractError::Pdf(e.to_string()));
        }
    };

    let model = split_pages(&raw_text);
    if let DocumentModel::FlatText { pages, full_text } = &model {
        if full_text.trim().is_empty() {
            warn!("PDF yielded no text, it may be scanned");
        }
        debug!(pages = pages.len(), "extracted pdf text");
    }
    Ok(model)
}

/// Split extracted text on form feeds into trimmed pages
pub fn split_pages(raw_text: &str) -> DocumentModel {
    let mut pages: Vec<Page> = raw_text
        .split('\x0C')
        .enumerate()
        .map(|(i, text)| Page {
            number: (i + 1) as u32,
            text: text.trim().to_string(),
        })
        .collect();

    // A trailing form feed leaves an empty last page
    if pages.len() > 1 && pages.last().is_some_and(|p| p.text.is_empty()) {
        pages.pop();
    }

    let full_text = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    DocumentModel::FlatText { pages, full_text }
}
