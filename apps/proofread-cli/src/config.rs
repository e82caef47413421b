//! TOML configuration for a proofreading run
//!
//! Every section is optional; missing fields fall back to their defaults.
//!
//! ```toml
//! [validation]
//! total_tolerance = { relative = 0.005, absolute = 0.11 }
//!
//! [review]
//! chunk_char_limit = 3000
//!
//! [reviewer]
//! command = "my-llm --json"
//! rules = ["rules/terms.md", "rules/common_errors.md"]
//!
//! [annotate]
//! author = "审校组"
//! ```

use anyhow::Context;
use review_core::{ReviewConfig, REFERENCE_CHAR_LIMIT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use verification_engine::ValidationConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tolerances, ratio ranges and terminology table
    pub validation: ValidationConfig,
    /// Chunk and prompt budgets
    pub review: ReviewConfig,
    pub reviewer: ReviewerConfig,
    pub annotate: AnnotateConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }
}

/// External reviewer command and the reference material it gets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewerConfig {
    /// Shell command; the chunked review is skipped when unset
    pub command: Option<String>,
    pub rules: Vec<PathBuf>,
    /// Characters kept from each rules file
    pub reference_char_limit: usize,
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            command: None,
            rules: Vec::new(),
            reference_char_limit: REFERENCE_CHAR_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    pub author: String,
    pub initials: String,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        let options = docx_annotate::AnnotateOptions::default();
        Self {
            author: options.author,
            initials: options.initials,
        }
    }
}
