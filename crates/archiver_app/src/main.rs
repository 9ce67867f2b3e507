mod cli;
mod config;
mod progress;

use std::process::ExitCode;

use anyhow::{Context, Result};
use archiver_engine::{Archiver, ChromiumDriver, RunSummary};
use archiver_logging::{archive_error, archive_info, LogDestination};
use clap::Parser;
use log::LevelFilter;

use crate::cli::Cli;
use crate::config::{FileConfig, Settings};
use crate::progress::TerminalProgress;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match cli.log_file.clone() {
        Some(path) => LogDestination::TerminalAndFile(path),
        None => LogDestination::Terminal,
    };
    archiver_logging::initialize(destination, level);

    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            archive_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let file = match cli.config.as_deref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(cli, file, |name| std::env::var(name).ok())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;
    runtime.block_on(archive(settings))
}

async fn archive(settings: Settings) -> Result<RunSummary> {
    let archiver = match settings.credentials.as_ref() {
        Some(credentials) => {
            archive_info!("Premium mode: launching browser");
            let driver = ChromiumDriver::launch(&settings.browser)
                .await
                .context("cannot launch browser")?;
            Archiver::with_session(settings.archive, driver, credentials).await?
        }
        None => Archiver::direct(settings.archive)?,
    };

    archive_info!(
        "Archiving {} as {}",
        archiver.publication().base_url(),
        archiver.publication().writer_name()
    );
    Ok(archiver.run(&TerminalProgress).await?)
}
