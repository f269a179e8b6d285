//! `podcast-organizer`: turn an OPML export into an organized Markdown list.
mod cli;
mod config;
mod console;
mod pipeline;

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use organizer_logging::{organizer_error, LogDestination};

use crate::cli::Cli;
use crate::config::Config;
use crate::console::Console;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    organizer_logging::initialize(destination, level);

    let console = Console::stdout(cli.verbose);
    match execute(&cli, &console).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            organizer_error!("{err:#}");
            console.error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: &Cli, console: &Console) -> anyhow::Result<pipeline::RunSummary> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    pipeline::run(cli, &config, console).await
}
