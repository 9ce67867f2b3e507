//! Archiver engine: discovery, fetching, extraction and persistence of
//! publication posts.
mod chromium;
mod config;
mod convert;
mod decode;
mod discovery;
mod extract;
mod fetch;
mod filename;
mod header;
mod http;
mod index;
mod persist;
mod pipeline;
mod session;
mod store;
mod types;

pub use chromium::{BrowserOptions, ChromiumDriver};
pub use config::ArchiveConfig;
pub use convert::{markdown_to_html, Converter, Html2MdConverter};
pub use decode::{decode_body, DecodeError};
pub use discovery::{parse_feed, parse_sitemap, DiscoveredUrls, DiscoveryError, UrlDiscovery};
pub use extract::{ExtractError, Extractor, PostExtractor, PostSelectors};
pub use fetch::{DirectFetcher, PageFetcher, PAYWALL_SELECTOR};
pub use filename::filename_from_url;
pub use header::build_markdown_document;
pub use http::{HttpBody, HttpClient, HttpSettings};
pub use index::{render_author_index, IndexError};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError, WriteOutcome};
pub use pipeline::{ArchiveError, Archiver};
pub use session::{BrowserDriver, Credentials, DriverError, LoginError, LoginSettings, SessionFetcher};
pub use store::{ArchiveStore, LedgerMerge, StoreRoots};
pub use types::{
    ArchiveEvent, DiscoverySource, FailureKind, FetchError, FetchOutcome, NullProgressSink,
    PageDocument, ProgressSink, RunSummary,
};
