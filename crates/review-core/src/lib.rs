//! Chunked review of planning documents by an external reviewer
//!
//! The document is split into budgeted chunks, each chunk is rendered into a
//! self-contained prompt and sent to a [`Reviewer`], and the replies are
//! parsed and merged into one deduplicated list of findings.

pub mod chunk;
pub mod orchestrator;
pub mod prompt;
pub mod response;
pub mod reviewer;

pub use chunk::{split_paragraphs, Chunk};
pub use orchestrator::{review_document, ReviewConfig, ReviewOutcome, ReviewRequest};
pub use prompt::{ChunkPrompt, PromptLimits, SYSTEM_PROMPT};
pub use response::{parse_response, ReviewResponse};
pub use reviewer::{ReferenceRules, Reviewer, MISSING_REFERENCES, REFERENCE_CHAR_LIMIT};
