use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Transform OPML podcast subscriptions into an organized Markdown document.
///
/// Without --no-ai, podcasts are grouped into categories and tagged by the
/// configured AI provider.
#[derive(Parser, Debug, Clone)]
#[command(name = "podcast-organizer", version, about)]
pub struct Cli {
    /// OPML subscription export to read
    pub input: PathBuf,

    /// Output Markdown file (overrides config)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Only process the first N podcasts
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Per-feed fetch timeout in seconds (overrides config)
    #[arg(long, value_name = "SECS", allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// Maximum number of feeds fetched at once (overrides config)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    pub max_concurrent: Option<i64>,

    /// AI provider: claude or openai (overrides config)
    #[arg(long, value_name = "NAME")]
    pub provider: Option<String>,

    /// Model name for the selected provider (overrides config)
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Skip AI enrichment and write the basic document
    #[arg(long)]
    pub no_ai: bool,

    /// Show per-feed progress and failure details
    #[arg(short, long)]
    pub verbose: bool,

    /// Parse and fetch but do not write any file
    #[arg(long)]
    pub dry_run: bool,

    /// Configuration file (default: ./.podcast-organizer.yaml, then ~/.podcast-organizer.yaml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write an enrichment summary as JSON
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Mirror diagnostic logs into this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Flags win over the file and the environment.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.output.default_file = output.clone();
        }
        if let Some(timeout) = self.timeout {
            config.fetching.timeout = timeout;
        }
        if let Some(max_concurrent) = self.max_concurrent {
            config.fetching.max_concurrent = max_concurrent;
        }
        if let Some(provider) = &self.provider {
            config.ai.provider = provider.trim().to_lowercase();
        }
        if let Some(model) = &self.model {
            config.ai.model = Some(model.clone());
        }
    }
}
