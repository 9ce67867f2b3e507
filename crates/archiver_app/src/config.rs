use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use archiver_engine::{ArchiveConfig, BrowserOptions, Credentials, StoreRoots};
use serde::Deserialize;

use crate::cli::Cli;

pub const EMAIL_VAR: &str = "ARCHIVER_EMAIL";
pub const PASSWORD_VAR: &str = "ARCHIVER_PASSWORD";
const DEFAULT_TEMPLATE: &str = "author_template.html";

/// Optional RON file with the same knobs as the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub url: Option<String>,
    pub directory: Option<PathBuf>,
    pub html_directory: Option<PathBuf>,
    pub data_directory: Option<PathBuf>,
    pub stylesheet: Option<PathBuf>,
    pub number: Option<usize>,
    pub premium: Option<bool>,
    pub headless: Option<bool>,
    pub browser_path: Option<PathBuf>,
    pub user_agent: Option<String>,
    pub template: Option<PathBuf>,
    pub excluded_keywords: Option<Vec<String>>,
    pub email: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }
}

/// Settings for one run after merging flags, file and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub archive: ArchiveConfig,
    pub browser: BrowserOptions,
    /// Present exactly when the run signs in.
    pub credentials: Option<Credentials>,
}

impl Settings {
    /// Flags win over the file, the file wins over defaults.
    pub fn resolve<E>(cli: &Cli, file: FileConfig, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let Some(url) = cli.url.clone().or(file.url) else {
            bail!("no publication url given; pass --url or set `url` in the config file");
        };

        let defaults = StoreRoots::default();
        let roots = StoreRoots {
            markdown_dir: pick(cli.directory.clone(), file.directory, defaults.markdown_dir),
            html_dir: pick(
                cli.html_directory.clone(),
                file.html_directory,
                defaults.html_dir,
            ),
            data_dir: pick(
                cli.data_directory.clone(),
                file.data_directory,
                defaults.data_dir,
            ),
            stylesheet: file.stylesheet.unwrap_or(defaults.stylesheet),
        };

        let user_agent = cli.user_agent.clone().or(file.user_agent);
        let mut archive = ArchiveConfig::new(url);
        archive.roots = roots;
        archive.post_limit = cli.number.or(file.number).filter(|&n| n > 0);
        archive.index_template = cli
            .template
            .clone()
            .or(file.template)
            .or_else(default_template);
        if let Some(keywords) = file.excluded_keywords {
            archive.excluded_keywords = keywords;
        }
        archive.http.user_agent = user_agent.clone();

        let browser = BrowserOptions {
            headless: cli.headless || file.headless.unwrap_or(false),
            executable: cli.browser_path.clone().or(file.browser_path),
            user_agent,
        };

        let premium = cli.premium || file.premium.unwrap_or(false);
        let credentials = if premium {
            Some(resolve_credentials(file.email, env)?)
        } else {
            None
        };

        Ok(Self {
            archive,
            browser,
            credentials,
        })
    }
}

fn pick<T>(flag: Option<T>, file: Option<T>, default: T) -> T {
    flag.or(file).unwrap_or(default)
}

fn default_template() -> Option<PathBuf> {
    let path = PathBuf::from(DEFAULT_TEMPLATE);
    path.is_file().then_some(path)
}

/// Email from the environment or the file; the password only from the
/// environment.
fn resolve_credentials<E>(file_email: Option<String>, env: E) -> Result<Credentials>
where
    E: Fn(&str) -> Option<String>,
{
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let Some(email) = non_empty(env(EMAIL_VAR)).or(non_empty(file_email)) else {
        bail!("premium mode needs an email: set {EMAIL_VAR} or `email` in the config file");
    };
    let Some(password) = non_empty(env(PASSWORD_VAR)) else {
        bail!("premium mode needs a password: set {PASSWORD_VAR}");
    };
    Ok(Credentials { email, password })
}
