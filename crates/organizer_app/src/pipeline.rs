use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use organizer_core::{render_basic_markdown, render_enriched_markdown, PodcastRecord};
use organizer_engine::{
    create_oracle, enrich_records, fetch_all, parse_opml_file, write_enrichment_report,
    write_file, EnrichmentReport, NoopProgress, ProgressSink, ReqwestFetcher,
};
use organizer_logging::{organizer_error, organizer_info};

use crate::cli::Cli;
use crate::config::Config;
use crate::console::Console;

/// What one run did, for the caller and for tests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub fetched: usize,
    pub failed: usize,
    pub enriched: bool,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
}

/// Parse, fetch, optionally enrich, render and write.
///
/// `config` must already carry environment and flag overrides.
pub async fn run(cli: &Cli, config: &Config, console: &Console) -> Result<RunSummary> {
    let use_ai = !cli.no_ai;
    let errors = config.validate(use_ai);
    if !errors.is_empty() {
        console.line("Configuration errors:");
        for error in &errors {
            console.detail(&format!("- {error}"));
        }
        console.blank();
        console.line(
            "Tip: create .podcast-organizer.yaml with your API keys, or set ANTHROPIC_API_KEY / OPENAI_API_KEY",
        );
        bail!("invalid configuration ({} problems)", errors.len());
    }

    let phase = if use_ai {
        format!("Phase 2 (AI: {})", config.ai.provider)
    } else {
        "Phase 1 (No AI)".to_string()
    };
    console.line(&format!("Podcast Organizer - {phase}"));
    console.blank();

    console.step(1, &format!("Parsing OPML file: {}", cli.input.display()));
    let references = parse_opml_file(&cli.input, cli.limit)
        .with_context(|| format!("failed to parse {}", cli.input.display()))?;
    console.done(&format!("Found {} podcast(s)", references.len()));
    console.blank();
    if references.is_empty() {
        console.warn("No podcast entries found in OPML file");
        return Ok(RunSummary::default());
    }

    console.step(2, "Fetching RSS metadata");
    let settings = config.fetch_settings();
    console.detail(&format!(
        "Settings: timeout={}s, max_concurrent={}",
        settings.timeout.as_secs(),
        config.max_concurrent()
    ));
    let fetcher = ReqwestFetcher::new(settings).context("failed to build HTTP client")?;
    let sink: &dyn ProgressSink = if console.is_verbose() {
        console
    } else {
        &NoopProgress
    };
    let records = fetch_all(&fetcher, &references, config.max_concurrent(), sink).await;

    let fetched = records.iter().filter(|r| r.is_resolvable()).count();
    let failed = records.len() - fetched;
    console.done(&format!("Fetched: {fetched} successful, {failed} failed"));
    console.blank();
    if failed > 0 && console.is_verbose() {
        console.line("Failed feeds:");
        for record in &records {
            if let Some(error) = record.fetch_error() {
                console.detail(&format!("- {}: {}", record.original_title, error));
            }
        }
        console.blank();
    }

    let mut summary = RunSummary {
        total: records.len(),
        fetched,
        failed,
        ..RunSummary::default()
    };

    let (outcome, report) = if use_ai {
        console.step(3, "AI enrichment");
        enrich(records, config, console).await?
    } else {
        (Outcome::Basic(records), None)
    };

    let step = if use_ai { 4 } else { 3 };
    console.step(step, "Generating markdown output");
    let markdown = match &outcome {
        Outcome::Enriched(records) => {
            summary.enriched = true;
            render_enriched_markdown(records)
        }
        Outcome::Basic(records) => render_basic_markdown(records),
    };

    let output = &config.output.default_file;
    if cli.dry_run {
        console.detail("Dry run - skipping file write");
        console.detail(&format!("Would write to: {}", output.display()));
    } else {
        let written = write_file(output, &markdown)
            .with_context(|| format!("failed to write {}", output.display()))?;
        console.done(&format!("Written to: {}", display_path(&written).display()));
        summary.output = Some(written);

        if let (Some(path), Some(report)) = (&cli.report, &report) {
            let written = write_enrichment_report(path, report)
                .with_context(|| format!("failed to write report {}", path.display()))?;
            console.done(&format!("Report written to: {}", written.display()));
            summary.report = Some(written);
        }
    }
    console.blank();
    console.line("✓ Complete!");

    organizer_info!(
        "run finished: {} podcasts, {} fetched, enriched: {}",
        summary.total,
        summary.fetched,
        summary.enriched
    );
    Ok(summary)
}

enum Outcome {
    Enriched(Vec<PodcastRecord>),
    Basic(Vec<PodcastRecord>),
}

/// Enrichment failures degrade to the basic document. Only a backend that
/// cannot be built at all is an error.
async fn enrich(
    records: Vec<PodcastRecord>,
    config: &Config,
    console: &Console,
) -> Result<(Outcome, Option<EnrichmentReport>)> {
    let oracle = create_oracle(&config.oracle_settings())?;
    let resolvable = records.iter().filter(|r| r.is_resolvable()).count();
    console.detail(&format!(
        "Categorizing {resolvable} podcasts with {}",
        oracle.name()
    ));

    match enrich_records(records.clone(), oracle.as_ref(), &config.enrich_options()).await {
        Ok(enrichment) => {
            let report = enrichment.report;
            console.done(&format!(
                "Categorized {} podcasts into {} categories ({} uncategorized)",
                report.categorized,
                report.categories.len(),
                report.uncategorized
            ));
            console.done(&format!(
                "Tagged: {} by AI, {} generated locally",
                report.tags.oracle, report.tags.fallback
            ));
            if report.failed_batches > 0 {
                console.warn(&format!(
                    "{} tag batch(es) failed; generated tags were used instead",
                    report.failed_batches
                ));
            }
            console.blank();
            Ok((Outcome::Enriched(enrichment.records), Some(report)))
        }
        Err(err) => {
            organizer_error!("enrichment with {} failed: {}", oracle.name(), err);
            console.error(&format!("AI enrichment failed: {err}"));
            console.warn("no categories produced, writing the basic document instead");
            console.blank();
            Ok((Outcome::Basic(records), None))
        }
    }
}

fn display_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
