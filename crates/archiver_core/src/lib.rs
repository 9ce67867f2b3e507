//! Archiver core: publication identity, URL filtering, post records and run
//! bookkeeping. Nothing in here touches the network or the filesystem.
mod filter;
mod progress;
mod publication;
mod record;

pub use filter::{filter_urls, DEFAULT_EXCLUDED_KEYWORDS};
pub use progress::{PostOutcome, RunProgress};
pub use publication::{writer_name_from_url, Publication, PublicationError};
pub use record::{merge_records, Post, PostRecord, DATE_NOT_FOUND};
