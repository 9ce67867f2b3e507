use std::path::PathBuf;

use archiver_logging::{archive_debug, archive_warn};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;

use crate::session::{BrowserDriver, DriverError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserOptions {
    pub headless: bool,
    /// Chromium-family executable; searched for on `PATH` when unset.
    pub executable: Option<PathBuf>,
    pub user_agent: Option<String>,
}

/// Chromium over the DevTools protocol, one tab for the whole run.
pub struct ChromiumDriver {
    // Owns the child process for as long as the driver lives.
    _browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch the browser. Must run inside a Tokio runtime: the protocol
    /// handler is spawned as a task on it.
    pub async fn launch(options: &BrowserOptions) -> Result<Self, DriverError> {
        let mut builder = BrowserConfig::builder();
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = options.executable.as_ref() {
            builder = builder.chrome_executable(path);
        }
        if let Some(agent) = options.user_agent.as_deref() {
            builder = builder.arg(format!("--user-agent={agent}"));
        }
        let config = builder.build().map_err(DriverError)?;

        let (browser, mut events) = Browser::launch(config).await.map_err(cdp_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(err) = event {
                    archive_warn!("Browser connection closed: {}", err);
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(cdp_error)?;
        archive_debug!("Browser launched (headless: {})", options.headless);
        Ok(Self {
            _browser: browser,
            page,
            handler,
        })
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait::async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.page.goto(url).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn exists(&self, selector: &str) -> Result<bool, DriverError> {
        let found = self.page.find_elements(selector).await.map_err(cdp_error)?;
        Ok(!found.is_empty())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool, DriverError> {
        let selector_literal =
            serde_json::to_string(selector).map_err(|err| DriverError(err.to_string()))?;
        let script = format!(
            "(() => {{ const el = document.querySelector({selector_literal}); \
             if (!el) return false; \
             const style = window.getComputedStyle(el); \
             return style.display !== 'none' && style.visibility !== 'hidden' \
             && el.getClientRects().length > 0; }})()"
        );
        let result = self.page.evaluate(script).await.map_err(cdp_error)?;
        result
            .into_value::<bool>()
            .map_err(|err| DriverError(err.to_string()))
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        let element = self.page.find_element(selector).await.map_err(cdp_error)?;
        element.click().await.map_err(cdp_error)?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        let element = self.page.find_element(selector).await.map_err(cdp_error)?;
        element
            .click()
            .await
            .map_err(cdp_error)?
            .type_str(text)
            .await
            .map_err(cdp_error)?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let url = self.page.url().await.map_err(cdp_error)?;
        Ok(url.unwrap_or_default())
    }

    async fn page_source(&self) -> Result<String, DriverError> {
        self.page.content().await.map_err(cdp_error)
    }
}

fn cdp_error(err: CdpError) -> DriverError {
    DriverError(err.to_string())
}
