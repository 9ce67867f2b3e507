use archiver_logging::archive_info;
use scraper::{Html, Selector};

use crate::http::HttpClient;
use crate::{FetchError, FetchOutcome, PageDocument};

/// Marker element the platform renders in place of gated content.
pub const PAYWALL_SELECTOR: &str = "h2.paywall-title";

/// Retrieves a rendered post page.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError>;
}

/// Plain GET, no session: premium posts come back gated.
#[derive(Debug, Clone)]
pub struct DirectFetcher {
    client: HttpClient,
    paywall: Selector,
}

impl DirectFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            paywall: paywall_selector(),
        }
    }
}

#[async_trait::async_trait]
impl PageFetcher for DirectFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        let body = self.client.get_text(url).await?;
        Ok(classify(url, body.text, &self.paywall))
    }
}

pub(crate) fn paywall_selector() -> Selector {
    Selector::parse(PAYWALL_SELECTOR).expect("paywall selector is valid css")
}

/// Wrap a page as a document unless it carries the paywall marker.
pub(crate) fn classify(url: &str, html: String, paywall: &Selector) -> FetchOutcome {
    let gated = Html::parse_document(&html).select(paywall).next().is_some();
    if gated {
        archive_info!("Skipping premium article: {}", url);
        return FetchOutcome::Paywalled;
    }
    FetchOutcome::Document(PageDocument {
        url: url.to_string(),
        html,
    })
}
