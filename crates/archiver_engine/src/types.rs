use std::fmt;

use archiver_core::PostOutcome;

/// A rendered page, ready for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    pub url: String,
    pub html: String,
}

/// Result of a successful fetch: either a usable page or a premium gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Document(PageDocument),
    Paywalled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Browser,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "undecodable body"),
            FailureKind::Browser => write!(f, "browser error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Where the candidate post URLs came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverySource {
    Sitemap,
    /// Partial: the feed only lists the most recent posts.
    Feed,
    None,
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoverySource::Sitemap => write!(f, "sitemap"),
            DiscoverySource::Feed => write!(f, "feed"),
            DiscoverySource::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEvent {
    Discovered {
        source: DiscoverySource,
        count: usize,
        total: usize,
    },
    PostStarted {
        attempt: usize,
        total: usize,
        url: String,
    },
    PostFinished {
        url: String,
        outcome: PostOutcome,
    },
    RunFinished(RunSummary),
}

/// Receives progress events from a running archive.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ArchiveEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: ArchiveEvent) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub writer_name: String,
    pub source: DiscoverySource,
    pub discovered: usize,
    pub attempts: usize,
    pub saved: usize,
    pub already_archived: usize,
    pub paywalled: usize,
    pub unextractable: usize,
    pub failed: usize,
    pub ledger_added: usize,
    pub ledger_total: usize,
}
