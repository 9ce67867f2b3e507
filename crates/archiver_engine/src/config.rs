use std::path::PathBuf;

use archiver_core::DEFAULT_EXCLUDED_KEYWORDS;

use crate::extract::PostSelectors;
use crate::http::HttpSettings;
use crate::session::LoginSettings;
use crate::store::StoreRoots;

/// Everything one archiving run needs, passed explicitly to the archiver.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub publication_url: String,
    pub roots: StoreRoots,
    /// Author index template; no index is rendered when unset.
    pub index_template: Option<PathBuf>,
    /// Cap on attempted posts; `None` or `Some(0)` means all of them.
    pub post_limit: Option<usize>,
    pub excluded_keywords: Vec<String>,
    pub http: HttpSettings,
    pub selectors: PostSelectors,
    pub login: LoginSettings,
}

impl ArchiveConfig {
    pub fn new(publication_url: impl Into<String>) -> Self {
        Self {
            publication_url: publication_url.into(),
            roots: StoreRoots::default(),
            index_template: None,
            post_limit: None,
            excluded_keywords: DEFAULT_EXCLUDED_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            http: HttpSettings::default(),
            selectors: PostSelectors::default(),
            login: LoginSettings::default(),
        }
    }
}
