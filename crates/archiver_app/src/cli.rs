use std::path::PathBuf;

use clap::Parser;

/// Archive a newsletter publication as Markdown, HTML and a JSON ledger.
#[derive(Debug, Default, Parser)]
#[command(name = "archiver", version, about)]
pub struct Cli {
    /// Publication base URL.
    #[arg(short, long)]
    pub url: Option<String>,

    /// Root directory for Markdown files.
    #[arg(short, long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Root directory for HTML pages.
    #[arg(long, value_name = "DIR")]
    pub html_directory: Option<PathBuf>,

    /// Directory holding the per-publication ledgers.
    #[arg(long, value_name = "DIR")]
    pub data_directory: Option<PathBuf>,

    /// Number of posts to attempt; 0 attempts all of them.
    #[arg(short, long, value_name = "N")]
    pub number: Option<usize>,

    /// Sign in through a browser to fetch premium posts.
    #[arg(short, long)]
    pub premium: bool,

    /// Run the browser without a window.
    #[arg(long)]
    pub headless: bool,

    /// Chromium-family executable used in premium mode.
    #[arg(long, value_name = "PATH")]
    pub browser_path: Option<PathBuf>,

    /// User agent for HTTP requests and the browser.
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    /// Author index template.
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// RON configuration file.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also write logs to this file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging.
    #[arg(short, long)]
    pub verbose: bool,
}
