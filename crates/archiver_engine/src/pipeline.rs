use archiver_core::{PostOutcome, PostRecord, Publication, PublicationError, RunProgress};
use archiver_logging::{archive_error, archive_info, archive_warn};
use thiserror::Error;

use crate::config::ArchiveConfig;
use crate::discovery::UrlDiscovery;
use crate::extract::{ExtractError, Extractor, PostExtractor};
use crate::fetch::{DirectFetcher, PageFetcher};
use crate::http::HttpClient;
use crate::index::{render_author_index, IndexError};
use crate::persist::{PersistError, WriteOutcome};
use crate::session::{BrowserDriver, Credentials, LoginError, SessionFetcher};
use crate::store::{ArchiveStore, LedgerMerge};
use crate::{ArchiveEvent, DiscoverySource, FetchError, FetchOutcome, ProgressSink, RunSummary};

/// Errors that end a run. Per-post failures never show up here.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Publication(#[from] PublicationError),
    #[error("cannot build http client: {0}")]
    HttpClient(FetchError),
    #[error("invalid post selectors: {0}")]
    Selectors(#[from] ExtractError),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error("cannot write archive: {0}")]
    Persist(#[from] PersistError),
    #[error("cannot render author index: {0}")]
    Index(#[from] IndexError),
}

#[derive(Debug, Error)]
enum PostError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

enum Step {
    Saved(PostRecord),
    Skipped(PostOutcome),
}

/// Drives discovery, fetching, extraction and persistence for one
/// publication, one post at a time.
pub struct Archiver {
    config: ArchiveConfig,
    publication: Publication,
    discovery: UrlDiscovery,
    fetcher: Box<dyn PageFetcher>,
    extractor: Box<dyn Extractor>,
    store: ArchiveStore,
}

impl Archiver {
    pub fn new(config: ArchiveConfig, fetcher: Box<dyn PageFetcher>) -> Result<Self, ArchiveError> {
        let publication = Publication::parse(&config.publication_url)?;
        let client = HttpClient::new(&config.http).map_err(ArchiveError::HttpClient)?;
        let discovery = UrlDiscovery::new(client, config.excluded_keywords.clone());
        let extractor = PostExtractor::new(&config.selectors)?;
        let store = ArchiveStore::new(&config.roots, publication.writer_name());

        Ok(Self {
            config,
            publication,
            discovery,
            fetcher,
            extractor: Box::new(extractor),
            store,
        })
    }

    /// Archiver fetching posts with plain GET requests.
    pub fn direct(config: ArchiveConfig) -> Result<Self, ArchiveError> {
        let client = HttpClient::new(&config.http).map_err(ArchiveError::HttpClient)?;
        Self::new(config, Box::new(DirectFetcher::new(client)))
    }

    /// Archiver fetching posts through a signed-in browser session.
    ///
    /// Fails before any post is touched when the sign-in does not succeed.
    pub async fn with_session<D>(
        config: ArchiveConfig,
        driver: D,
        credentials: &Credentials,
    ) -> Result<Self, ArchiveError>
    where
        D: BrowserDriver + 'static,
    {
        // Reject a bad publication url before spending time on the login.
        Publication::parse(&config.publication_url)?;
        let fetcher = SessionFetcher::login(driver, credentials, &config.login).await?;
        Self::new(config, Box::new(fetcher))
    }

    pub fn publication(&self) -> &Publication {
        &self.publication
    }

    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    pub async fn run(&self, sink: &dyn ProgressSink) -> Result<RunSummary, ArchiveError> {
        let discovered = self.discovery.discover(&self.publication).await;
        self.store.prepare()?;

        let mut progress = RunProgress::new(discovered.urls.len(), self.config.post_limit);
        sink.emit(ArchiveEvent::Discovered {
            source: discovered.source,
            count: discovered.urls.len(),
            total: progress.total(),
        });

        let mut records = Vec::new();
        for url in &discovered.urls {
            if progress.is_exhausted() {
                break;
            }
            sink.emit(ArchiveEvent::PostStarted {
                attempt: progress.attempts() + 1,
                total: progress.total(),
                url: url.clone(),
            });

            let outcome = match self.archive_post(url).await {
                Ok(Step::Saved(record)) => {
                    records.push(record);
                    PostOutcome::Saved
                }
                Ok(Step::Skipped(outcome)) => outcome,
                Err(err) => {
                    archive_error!("Error scraping post {}: {}", url, err);
                    PostOutcome::Failed
                }
            };
            progress.record(outcome);
            sink.emit(ArchiveEvent::PostFinished {
                url: url.clone(),
                outcome,
            });
        }

        let merge = self.store.merge_ledger(records)?;
        archive_info!(
            "Ledger {}: {} new records, {} total",
            self.store.ledger_path().display(),
            merge.added,
            merge.total
        );
        self.render_index()?;

        let summary = summarize(
            &self.publication,
            discovered.source,
            discovered.urls.len(),
            &progress,
            merge,
        );
        sink.emit(ArchiveEvent::RunFinished(summary.clone()));
        Ok(summary)
    }

    async fn archive_post(&self, url: &str) -> Result<Step, PostError> {
        if self.store.is_archived(url) {
            archive_info!(
                "File already exists: {}",
                self.store.markdown_path(url).display()
            );
            return Ok(Step::Skipped(PostOutcome::AlreadyArchived));
        }

        let page = match self.fetcher.fetch(url).await? {
            FetchOutcome::Document(page) => page,
            FetchOutcome::Paywalled => {
                archive_info!("Unable to fetch {}, skipping.", url);
                return Ok(Step::Skipped(PostOutcome::Paywalled));
            }
        };

        let post = match self.extractor.extract(&page.html) {
            Ok(post) => post,
            Err(err) => {
                archive_warn!("Skipping post due to missing data: {}: {}", url, err);
                return Ok(Step::Skipped(PostOutcome::Unextractable));
            }
        };

        let markdown_path = match self.store.write_markdown(url, &post.markdown)? {
            WriteOutcome::Created(path) => path,
            WriteOutcome::AlreadyExists(_) => {
                return Ok(Step::Skipped(PostOutcome::AlreadyArchived));
            }
        };
        let html_path = self.store.write_html(url, &post.title, &post.markdown)?;

        Ok(Step::Saved(post.into_record(
            markdown_path.display().to_string(),
            html_path.display().to_string(),
        )))
    }

    fn render_index(&self) -> Result<(), ArchiveError> {
        let Some(template) = self.config.index_template.as_deref() else {
            return Ok(());
        };
        let path = render_author_index(
            template,
            &self.config.roots.html_dir,
            self.publication.writer_name(),
            &self.store.ledger_path(),
        )?;
        archive_info!("Author index written to {}", path.display());
        Ok(())
    }
}

fn summarize(
    publication: &Publication,
    source: DiscoverySource,
    discovered: usize,
    progress: &RunProgress,
    merge: LedgerMerge,
) -> RunSummary {
    RunSummary {
        writer_name: publication.writer_name().to_string(),
        source,
        discovered,
        attempts: progress.attempts(),
        saved: progress.count(PostOutcome::Saved),
        already_archived: progress.count(PostOutcome::AlreadyArchived),
        paywalled: progress.count(PostOutcome::Paywalled),
        unextractable: progress.count(PostOutcome::Unextractable),
        failed: progress.count(PostOutcome::Failed),
        ledger_added: merge.added,
        ledger_total: merge.total,
    }
}
