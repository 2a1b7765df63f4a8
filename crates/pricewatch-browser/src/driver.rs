//! Abstract browser-automation contract.
//!
//! Two backends implement this trait: [`crate::CdpDriver`] drives an
//! in-process headless Chromium over the DevTools protocol, and
//! [`crate::WebDriverSession`] talks to an external WebDriver endpoint.
//! Callers pick a backend through [`build_driver`]; scrapers only ever see
//! `Box<dyn BrowserDriver>`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::DriverError;

/// Page-text fragments that indicate the site served a bot-detection
/// interstitial instead of real content. Matched case-insensitively.
pub(crate) const ANTI_BOT_MARKERS: &[&str] = &[
    "captcha",
    "are you a robot",
    "cloudflare",
    "access denied",
    "verify you are human",
    "unusual traffic",
    "request blocked",
    "pardon our interruption",
];

/// Backend-independent session settings, assembled by the hosting
/// application from its config plus the per-source scraping config.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub headless: bool,
    /// Dedicated lightweight Chromium binary (constrained environments).
    pub chromium_binary: Option<PathBuf>,
    /// When set, [`build_driver`] selects the WebDriver backend.
    pub webdriver_url: Option<String>,
    pub navigation_timeout: Duration,
    /// Base delay for linear navigation backoff: attempt × base.
    pub backoff_base: Duration,
    /// Extra request headers from the source configuration.
    pub extra_headers: Vec<(String, String)>,
    pub viewport: (u32, u32),
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_binary: None,
            webdriver_url: None,
            navigation_timeout: Duration::from_secs(30),
            backoff_base: Duration::from_millis(1_000),
            extra_headers: Vec::new(),
            viewport: (1_366, 768),
        }
    }
}

/// Contract shared by both automation backends.
///
/// Accessor methods (`extract_*`, `click_element`, `type_text`,
/// `wait_for_selector`) are best-effort: they return empty strings or
/// `false` instead of erroring, so callers can probe several candidate
/// selectors without unwinding. Only `initialize`, `navigate_to_url`, and
/// `screenshot` surface typed errors.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Launches an isolated browsing context with a randomized user agent,
    /// realistic headers, and a desktop viewport.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Launch`] after the whole fallback chain of
    /// launch profiles has been exhausted.
    async fn initialize(&mut self) -> Result<(), DriverError>;

    /// Navigates with up to `max_retries` additional attempts, sleeping
    /// `attempt × backoff_base` between tries.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::NotInitialized`] before `initialize`, or
    /// [`DriverError::Navigation`] once the retry budget is spent.
    async fn navigate_to_url(&mut self, url: &str, max_retries: u32) -> Result<(), DriverError>;

    /// Polls for an element until it appears or `timeout` elapses.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> bool;

    /// First matching element's text, or empty when absent.
    async fn extract_text(&mut self, selector: &str) -> String;

    /// Text of every matching element, in document order.
    async fn extract_text_multiple(&mut self, selector: &str) -> Vec<String>;

    /// Named attribute of the first matching element, or empty.
    async fn extract_attribute(&mut self, selector: &str, attribute: &str) -> String;

    /// Named attribute of every matching element, in document order.
    /// Elements without the attribute contribute an empty string so the
    /// result stays index-aligned with `extract_text_multiple`.
    async fn extract_attribute_multiple(&mut self, selector: &str, attribute: &str)
        -> Vec<String>;

    async fn click_element(&mut self, selector: &str) -> bool;

    async fn type_text(&mut self, selector: &str, text: &str) -> bool;

    /// Visible text of the whole page (used by the anti-bot probe).
    async fn page_text(&mut self) -> String;

    /// Saves a debug screenshot of the current page.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Screenshot`] when capture or the file write
    /// fails, and [`DriverError::NotInitialized`] before `initialize`.
    async fn screenshot(&mut self, path: &Path) -> Result<(), DriverError>;

    /// Scans rendered page text for bot-detection interstitials. Scrapers
    /// treat a `true` here as a non-retryable "no result" for the attempt.
    async fn has_anti_bot_protection(&mut self) -> bool {
        let text = self.page_text().await;
        contains_anti_bot_marker(&text)
    }

    /// Performs a trivial navigation to confirm the session still responds.
    async fn health_check(&mut self) -> bool;

    /// Releases all browser resources. Must be safe to call repeatedly and
    /// after a partial initialization failure.
    async fn cleanup(&mut self);
}

/// Selects a backend for the given settings: WebDriver when an endpoint is
/// configured, otherwise the in-process CDP backend.
#[must_use]
pub fn build_driver(settings: DriverSettings) -> Box<dyn BrowserDriver> {
    if settings.webdriver_url.is_some() {
        Box::new(crate::webdriver::WebDriverSession::new(settings))
    } else {
        Box::new(crate::cdp::CdpDriver::new(settings))
    }
}

/// Linear backoff delay before retry `attempt` (1-based).
pub(crate) fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    base.saturating_mul(attempt)
}

pub(crate) fn contains_anti_bot_marker(page_text: &str) -> bool {
    let text = page_text.to_lowercase();
    ANTI_BOT_MARKERS.iter().any(|marker| text.contains(marker))
}
