//! Planning document proofreading pipeline
//!
//! Glue between extraction, rule verification, chunked review, reporting
//! and comment injection, driven by a TOML [`config::Config`].

pub mod config;
pub mod pipeline;
pub mod report;
pub mod reviewer;

pub use config::Config;
pub use pipeline::{load_findings, run_pipeline, PipelineOptions, PipelineResult};
pub use reviewer::CommandReviewer;
