use archiver_core::{filter_urls, Publication};
use archiver_logging::{archive_info, archive_warn};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use thiserror::Error;

use crate::http::HttpClient;
use crate::{DiscoverySource, FetchError};

const SITEMAP_NS: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("malformed xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml document ends before its root element is closed")]
    Truncated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredUrls {
    pub source: DiscoverySource,
    pub urls: Vec<String>,
}

/// Finds candidate post URLs: sitemap first, feed as a partial fallback.
#[derive(Debug, Clone)]
pub struct UrlDiscovery {
    client: HttpClient,
    excluded_keywords: Vec<String>,
}

impl UrlDiscovery {
    pub fn new(client: HttpClient, excluded_keywords: Vec<String>) -> Self {
        Self {
            client,
            excluded_keywords,
        }
    }

    /// Never fails: a publication without reachable endpoints has no posts.
    pub async fn discover(&self, publication: &Publication) -> DiscoveredUrls {
        let sitemap_url = publication.sitemap_url();
        match self.fetch_sitemap(&sitemap_url).await {
            Ok(urls) if !urls.is_empty() => return self.finish(DiscoverySource::Sitemap, urls),
            Ok(_) => archive_info!("Sitemap at {} lists no urls", sitemap_url),
            Err(err) => archive_warn!("Error fetching sitemap at {}: {}", sitemap_url, err),
        }

        archive_warn!("Falling back to feed.xml. This will only contain the most recent posts.");
        let feed_url = publication.feed_url();
        match self.fetch_feed(&feed_url).await {
            Ok(urls) if !urls.is_empty() => self.finish(DiscoverySource::Feed, urls),
            Ok(_) => {
                archive_info!("Feed at {} lists no items", feed_url);
                self.finish(DiscoverySource::None, Vec::new())
            }
            Err(err) => {
                archive_warn!("Error fetching feed at {}: {}", feed_url, err);
                self.finish(DiscoverySource::None, Vec::new())
            }
        }
    }

    async fn fetch_sitemap(&self, url: &str) -> Result<Vec<String>, DiscoveryError> {
        let body = self.client.get_text(url).await?;
        parse_sitemap(&body.text)
    }

    async fn fetch_feed(&self, url: &str) -> Result<Vec<String>, DiscoveryError> {
        let body = self.client.get_text(url).await?;
        parse_feed(&body.text)
    }

    fn finish(&self, source: DiscoverySource, urls: Vec<String>) -> DiscoveredUrls {
        let found = urls.len();
        let urls = filter_urls(&urls, &self.excluded_keywords);
        archive_info!(
            "Discovered {} urls from {} ({} after filtering)",
            found,
            source,
            urls.len()
        );
        DiscoveredUrls { source, urls }
    }
}

/// Text of every `<loc>` in the sitemap namespace, in document order.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>, DiscoveryError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut urls = Vec::new();
    let mut nesting = Nesting::default();
    let mut current: Option<String> = None;
    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        nesting.track(&event);
        match (resolved, event) {
            (ResolveResult::Bound(Namespace(ns)), Event::Start(start))
                if ns == SITEMAP_NS && start.local_name().as_ref() == b"loc" =>
            {
                current = Some(String::new());
            }
            (_, Event::Text(text)) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&text.unescape()?);
                }
            }
            (_, Event::CData(data)) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&data));
                }
            }
            (_, Event::End(end)) if end.local_name().as_ref() == b"loc" => {
                if let Some(loc) = current.take() {
                    push_non_empty(&mut urls, loc);
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }
    nesting.finish()?;
    Ok(urls)
}

/// Text of the first direct `<link>` child of every `<item>`.
pub fn parse_feed(xml: &str) -> Result<Vec<String>, DiscoveryError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut urls = Vec::new();
    let mut nesting = Nesting::default();
    // Nesting depth below the current <item>, if inside one.
    let mut item_depth: Option<usize> = None;
    let mut item_has_link = false;
    let mut current: Option<String> = None;
    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        nesting.track(&event);
        match (resolved, event) {
            (resolved, Event::Start(start)) => match item_depth {
                None if start.local_name().as_ref() == b"item" => {
                    item_depth = Some(0);
                    item_has_link = false;
                }
                None => {}
                Some(depth) => {
                    let is_link = depth == 0
                        && matches!(resolved, ResolveResult::Unbound)
                        && start.local_name().as_ref() == b"link";
                    if is_link && !item_has_link {
                        current = Some(String::new());
                    }
                    item_depth = Some(depth + 1);
                }
            },
            (_, Event::End(_)) => match item_depth {
                Some(0) => item_depth = None,
                Some(depth) => {
                    if depth == 1 {
                        if let Some(link) = current.take() {
                            item_has_link |= push_non_empty(&mut urls, link);
                        }
                    }
                    item_depth = Some(depth - 1);
                }
                None => {}
            },
            (_, Event::Text(text)) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&text.unescape()?);
                }
            }
            (_, Event::CData(data)) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&data));
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }
    nesting.finish()?;
    Ok(urls)
}

/// Open-element count; the reader itself accepts a document cut off
/// mid-element.
#[derive(Debug, Default)]
struct Nesting {
    open: usize,
    saw_root: bool,
}

impl Nesting {
    fn track(&mut self, event: &Event<'_>) {
        match event {
            Event::Start(_) => {
                self.open += 1;
                self.saw_root = true;
            }
            Event::Empty(_) => self.saw_root = true,
            Event::End(_) => self.open = self.open.saturating_sub(1),
            _ => {}
        }
    }

    fn finish(&self) -> Result<(), DiscoveryError> {
        if self.open > 0 || !self.saw_root {
            return Err(DiscoveryError::Truncated);
        }
        Ok(())
    }
}

fn push_non_empty(urls: &mut Vec<String>, value: String) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    urls.push(trimmed.to_string());
    true
}
