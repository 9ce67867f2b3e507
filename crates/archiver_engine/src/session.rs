use std::fmt;
use std::time::Duration;

use archiver_logging::{archive_debug, archive_info};
use scraper::Selector;
use thiserror::Error;
use tokio::time::{sleep, Instant};

use crate::fetch::{classify, paywall_selector, PageFetcher};
use crate::{FailureKind, FetchError, FetchOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

/// The slice of browser automation the archiver needs.
#[async_trait::async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), DriverError>;
    async fn exists(&self, selector: &str) -> Result<bool, DriverError>;
    async fn is_visible(&self, selector: &str) -> Result<bool, DriverError>;
    async fn click(&self, selector: &str) -> Result<(), DriverError>;
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError>;
    async fn current_url(&self) -> Result<String, DriverError>;
    /// Page source after scripts have run.
    async fn page_source(&self) -> Result<String, DriverError>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where the sign-in flow lives and how long to wait for each step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSettings {
    pub sign_in_url: String,
    pub password_option: String,
    pub email_field: String,
    pub password_field: String,
    pub submit: String,
    pub error_region: String,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            sign_in_url: "https://substack.com/sign-in".to_string(),
            password_option: "a.login-option.substack-login__login-option".to_string(),
            email_field: r#"input[name="email"]"#.to_string(),
            password_field: r#"input[name="password"]"#.to_string(),
            submit: "#substack-login > div:nth-child(2) > div:nth-child(2) > form > button"
                .to_string(),
            error_region: "#error-container".to_string(),
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("login unsuccessful: check credentials or captcha")]
    Rejected,
    #[error("timed out after {waited:?} waiting for {waiting_for}")]
    Timeout {
        waited: Duration,
        waiting_for: String,
    },
    #[error("browser error during login: {0}")]
    Driver(#[from] DriverError),
}

/// Fetches through a logged-in browser session, so premium posts the
/// account is entitled to come back complete.
pub struct SessionFetcher<D> {
    driver: D,
    paywall: Selector,
}

impl<D: BrowserDriver> SessionFetcher<D> {
    /// Sign in with `credentials`; the fetcher only exists once signed in.
    pub async fn login(
        driver: D,
        credentials: &Credentials,
        settings: &LoginSettings,
    ) -> Result<Self, LoginError> {
        archive_info!("Signing in at {}", settings.sign_in_url);
        driver.goto(&settings.sign_in_url).await?;

        wait_for_element(&driver, &settings.password_option, settings).await?;
        driver.click(&settings.password_option).await?;

        wait_for_element(&driver, &settings.email_field, settings).await?;
        driver
            .type_text(&settings.email_field, &credentials.email)
            .await?;
        wait_for_element(&driver, &settings.password_field, settings).await?;
        driver
            .type_text(&settings.password_field, &credentials.password)
            .await?;
        driver.click(&settings.submit).await?;

        wait_for_login_outcome(&driver, settings).await?;
        archive_info!("Signed in as {}", credentials.email);

        Ok(Self {
            driver,
            paywall: paywall_selector(),
        })
    }
}

#[async_trait::async_trait]
impl<D: BrowserDriver> PageFetcher for SessionFetcher<D> {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        self.driver.goto(url).await.map_err(browser_error)?;
        let html = self.driver.page_source().await.map_err(browser_error)?;
        Ok(classify(url, html, &self.paywall))
    }
}

fn browser_error(err: DriverError) -> FetchError {
    FetchError::new(FailureKind::Browser, err.0)
}

async fn wait_for_element<D: BrowserDriver>(
    driver: &D,
    selector: &str,
    settings: &LoginSettings,
) -> Result<(), LoginError> {
    let started = Instant::now();
    loop {
        if driver.exists(selector).await? {
            return Ok(());
        }
        if started.elapsed() >= settings.timeout {
            return Err(LoginError::Timeout {
                waited: started.elapsed(),
                waiting_for: selector.to_string(),
            });
        }
        sleep(settings.poll_interval).await;
    }
}

/// Done when the error region shows (rejected) or the browser has left the
/// sign-in page (signed in).
async fn wait_for_login_outcome<D: BrowserDriver>(
    driver: &D,
    settings: &LoginSettings,
) -> Result<(), LoginError> {
    let started = Instant::now();
    loop {
        if driver.is_visible(&settings.error_region).await? {
            return Err(LoginError::Rejected);
        }
        let current = driver.current_url().await?;
        if !current.starts_with(&settings.sign_in_url) {
            archive_debug!("Left sign-in page for {}", current);
            return Ok(());
        }
        if started.elapsed() >= settings.timeout {
            return Err(LoginError::Timeout {
                waited: started.elapsed(),
                waiting_for: "sign-in to complete".to_string(),
            });
        }
        sleep(settings.poll_interval).await;
    }
}
