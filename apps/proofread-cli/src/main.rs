//! Proofreading CLI
//!
//! Checks a `.docx` or `.pdf` planning document and writes a Markdown report
//! plus, for `.docx` input, a copy with review comments.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use proofread_cli::{run_pipeline, CommandReviewer, Config, PipelineOptions};
use review_core::Reviewer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "proofread")]
#[command(version, about = "Proofread planning documents and annotate the findings")]
struct Args {
    /// Document to check (.docx or .pdf)
    input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Shell command used as the reviewer; reads the prompt on stdin
    #[arg(long)]
    reviewer_cmd: Option<String>,

    /// Character budget per review chunk
    #[arg(long)]
    chunk_chars: Option<usize>,

    /// Reference rules files passed to the reviewer
    #[arg(long, num_args = 1..)]
    rules: Vec<PathBuf>,

    /// Extra findings (JSON array) to merge into the report and annotation
    #[arg(long)]
    findings: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(command) = &self.reviewer_cmd {
            config.reviewer.command = Some(command.clone());
        }
        if let Some(chars) = self.chunk_chars {
            config.review.chunk_char_limit = chars;
        }
        if !self.rules.is_empty() {
            config.reviewer.rules = self.rules.clone();
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Progress goes to stderr, the result summary to stdout
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting proofread v{}", env!("CARGO_PKG_VERSION"));

    let config = args.load_config()?;
    let options = PipelineOptions {
        input: args.input.clone(),
        output_dir: args.output.clone(),
        findings_file: args.findings.clone(),
        date: None,
    };

    let mut command = config.reviewer.command.clone().map(CommandReviewer::new);
    let reviewer = command.as_mut().map(|r| r as &mut dyn Reviewer);
    let result = run_pipeline(&config, &options, reviewer)
        .with_context(|| format!("Proofreading failed for {}", args.input.display()))?;

    println!("{}", "═".repeat(50));
    println!("校对完成");
    println!("  问题总数 : {} 项", result.findings.len());
    if !result.summary.is_empty() {
        println!("  审校评估 : {}", result.summary);
    }
    println!("  校对报告 : {}", result.report_path.display());
    if let Some(path) = &result.annotated_path {
        println!("  批注文档 : {}", path.display());
    }
    println!("{}", "═".repeat(50));
    Ok(())
}
