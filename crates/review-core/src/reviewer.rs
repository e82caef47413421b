//! The reviewer seam and the reference material passed to it

use std::path::Path;

use tracing::{debug, warn};

/// Characters kept from each reference file
pub const REFERENCE_CHAR_LIMIT: usize = 2000;

/// Shown to the reviewer when no reference file could be read
pub const MISSING_REFERENCES: &str = "（参考文件未找到）";

const REFERENCE_SEPARATOR: &str = "\n\n---\n\n";

/// Single-shot text review capability, typically backed by an LLM.
///
/// Implementations receive one fully formed prompt and return the raw reply.
/// Transport failures are returned as errors and abort the review run.
pub trait Reviewer {
    fn review(&mut self, prompt: &str) -> anyhow::Result<String>;
}

impl<F> Reviewer for F
where
    F: FnMut(&str) -> anyhow::Result<String>,
{
    fn review(&mut self, prompt: &str) -> anyhow::Result<String> {
        self(prompt)
    }
}

/// Static domain rules appended to every chunk prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRules {
    text: String,
}

impl ReferenceRules {
    /// Wrap an already prepared rules text
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read each existing file, keeping at most `per_file_limit` characters
    pub fn load<P: AsRef<Path>>(paths: &[P], per_file_limit: usize) -> Self {
        let mut excerpts = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    debug!(path = %path.display(), "loaded reference rules");
                    excerpts.push(content.chars().take(per_file_limit).collect::<String>());
                }
                Err(e) => warn!(path = %path.display(), error = %e, "reference file unavailable"),
            }
        }

        if excerpts.is_empty() {
            Self::from_text(MISSING_REFERENCES)
        } else {
            Self::from_text(excerpts.join(REFERENCE_SEPARATOR))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for ReferenceRules {
    fn default() -> Self {
        Self::from_text(MISSING_REFERENCES)
    }
}
