//! DevTools-protocol backend on an in-process headless Chromium.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::driver::{backoff_delay, BrowserDriver, DriverSettings};
use crate::error::DriverError;
use crate::launch::{launch_profiles, random_user_agent, ExecutionEnv, DEFAULT_ACCEPT_LANGUAGE};

/// Chromium session driven over CDP. One isolated page per driver; the
/// event handler runs on a background task for the lifetime of the session.
pub struct CdpDriver {
    settings: DriverSettings,
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    user_agent: &'static str,
}

impl CdpDriver {
    #[must_use]
    pub fn new(settings: DriverSettings) -> Self {
        Self {
            settings,
            browser: None,
            page: None,
            handler_task: None,
            user_agent: random_user_agent(),
        }
    }

    fn build_config(&self, args: &[&'static str]) -> Result<BrowserConfig, String> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.settings.viewport.0, self.settings.viewport.1)
            .request_timeout(self.settings.navigation_timeout);

        if !self.settings.headless {
            builder = builder.with_head();
        }
        if let Some(binary) = &self.settings.chromium_binary {
            builder = builder.chrome_executable(binary);
        }
        for arg in args {
            builder = builder.arg(*arg);
        }

        builder.build()
    }

    async fn try_launch(&mut self, args: &[&'static str], timeout: Duration) -> Result<(), String> {
        let config = self.build_config(args)?;

        let (browser, mut handler) = tokio::time::timeout(timeout, Browser::launch(config))
            .await
            .map_err(|_| format!("browser launch timed out after {timeout:?}"))?
            .map_err(|e| format!("browser launch failed: {e}"))?;

        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| format!("failed to open initial page: {e}"))?;

        let override_params = SetUserAgentOverrideParams::builder()
            .user_agent(self.user_agent)
            .accept_language(DEFAULT_ACCEPT_LANGUAGE)
            .build()
            .map_err(|e| format!("invalid user-agent override: {e}"))?;
        page.set_user_agent(override_params)
            .await
            .map_err(|e| format!("failed to set user agent: {e}"))?;

        if !self.settings.extra_headers.is_empty() {
            let mut map = serde_json::Map::new();
            for (name, value) in &self.settings.extra_headers {
                map.insert(name.clone(), serde_json::Value::String(value.clone()));
            }
            page.execute(EnableParams::default())
                .await
                .map_err(|e| format!("failed to enable network domain: {e}"))?;
            page.execute(SetExtraHttpHeadersParams::new(Headers::new(
                serde_json::Value::Object(map),
            )))
            .await
            .map_err(|e| format!("failed to set extra headers: {e}"))?;
        }

        self.browser = Some(browser);
        self.page = Some(page);
        self.handler_task = Some(handler_task);
        Ok(())
    }
}

#[async_trait]
impl BrowserDriver for CdpDriver {
    async fn initialize(&mut self) -> Result<(), DriverError> {
        let env = ExecutionEnv::detect();
        let profiles = launch_profiles(env, &self.settings);
        let attempts = profiles.len();
        let mut last_error = String::new();

        for profile in profiles {
            match self.try_launch(&profile.args, profile.launch_timeout).await {
                Ok(()) => {
                    tracing::debug!(
                        profile = profile.label,
                        user_agent = self.user_agent,
                        "browser session started"
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        profile = profile.label,
                        error = %e,
                        "launch profile failed, falling back"
                    );
                    last_error = e;
                    // A half-launched browser must not leak into the next
                    // attempt.
                    self.cleanup().await;
                }
            }
        }

        Err(DriverError::Launch {
            attempts,
            last_error,
        })
    }

    async fn navigate_to_url(&mut self, url: &str, max_retries: u32) -> Result<(), DriverError> {
        let timeout = self.settings.navigation_timeout;
        let base = self.settings.backoff_base;
        let page = self.page.as_ref().ok_or(DriverError::NotInitialized)?;

        let mut last_error = String::new();
        for attempt in 0..=max_retries {
            let result = tokio::time::timeout(timeout, page.goto(url)).await;
            match result {
                Ok(Ok(_)) => {
                    // Navigation commit is enough; rendering settles during
                    // the caller's selector waits.
                    let _ = tokio::time::timeout(timeout, page.wait_for_navigation()).await;
                    return Ok(());
                }
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => last_error = format!("navigation timed out after {timeout:?}"),
            }

            if attempt < max_retries {
                let delay = backoff_delay(attempt + 1, base);
                tracing::warn!(
                    url,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "navigation failed, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(DriverError::Navigation {
            url: url.to_string(),
            attempts: max_retries + 1,
            last_error,
        })
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> bool {
        let Some(page) = self.page.as_ref() else {
            return false;
        };
        let deadline = Instant::now() + timeout;
        loop {
            if page.find_element(selector).await.is_ok() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    async fn extract_text(&mut self, selector: &str) -> String {
        let Some(page) = self.page.as_ref() else {
            return String::new();
        };
        match page.find_element(selector).await {
            Ok(element) => element
                .inner_text()
                .await
                .ok()
                .flatten()
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    async fn extract_text_multiple(&mut self, selector: &str) -> Vec<String> {
        let Some(page) = self.page.as_ref() else {
            return Vec::new();
        };
        let Ok(elements) = page.find_elements(selector).await else {
            return Vec::new();
        };
        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            if let Ok(Some(text)) = element.inner_text().await {
                let trimmed = text.trim().to_string();
                if !trimmed.is_empty() {
                    texts.push(trimmed);
                }
            }
        }
        texts
    }

    async fn extract_attribute(&mut self, selector: &str, attribute: &str) -> String {
        let Some(page) = self.page.as_ref() else {
            return String::new();
        };
        match page.find_element(selector).await {
            Ok(element) => element
                .attribute(attribute)
                .await
                .ok()
                .flatten()
                .unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    async fn extract_attribute_multiple(
        &mut self,
        selector: &str,
        attribute: &str,
    ) -> Vec<String> {
        let Some(page) = self.page.as_ref() else {
            return Vec::new();
        };
        let Ok(elements) = page.find_elements(selector).await else {
            return Vec::new();
        };
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            values.push(
                element
                    .attribute(attribute)
                    .await
                    .ok()
                    .flatten()
                    .unwrap_or_default(),
            );
        }
        values
    }

    async fn click_element(&mut self, selector: &str) -> bool {
        let Some(page) = self.page.as_ref() else {
            return false;
        };
        match page.find_element(selector).await {
            Ok(element) => element.click().await.is_ok(),
            Err(_) => false,
        }
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> bool {
        let Some(page) = self.page.as_ref() else {
            return false;
        };
        match page.find_element(selector).await {
            Ok(element) => {
                if element.click().await.is_err() {
                    return false;
                }
                element.type_str(text).await.is_ok()
            }
            Err(_) => false,
        }
    }

    async fn page_text(&mut self) -> String {
        let Some(page) = self.page.as_ref() else {
            return String::new();
        };
        match page.find_element("body").await {
            Ok(body) => body
                .inner_text()
                .await
                .ok()
                .flatten()
                .unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    async fn screenshot(&mut self, path: &Path) -> Result<(), DriverError> {
        let page = self.page.as_ref().ok_or(DriverError::NotInitialized)?;
        let bytes = page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
            .map_err(|e| DriverError::Screenshot(e.to_string()))?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| DriverError::Screenshot(format!("write {}: {e}", path.display())))?;
        Ok(())
    }

    async fn health_check(&mut self) -> bool {
        let Some(page) = self.page.as_ref() else {
            return false;
        };
        tokio::time::timeout(Duration::from_secs(10), page.goto("about:blank"))
            .await
            .map(|r| r.is_ok())
            .unwrap_or(false)
    }

    async fn cleanup(&mut self) {
        self.page = None;

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                tracing::warn!(error = %e, "browser close error during cleanup");
            }
        }
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Launching a real browser is out of reach for unit tests; the
    // uninitialized-session paths are not.

    #[tokio::test]
    async fn cleanup_is_idempotent_without_initialize() {
        let mut driver = CdpDriver::new(DriverSettings::default());
        driver.cleanup().await;
        driver.cleanup().await;
    }

    #[tokio::test]
    async fn accessors_are_best_effort_before_initialize() {
        let mut driver = CdpDriver::new(DriverSettings::default());
        assert_eq!(driver.extract_text("h1").await, "");
        assert!(driver.extract_text_multiple("li").await.is_empty());
        assert_eq!(driver.extract_attribute("a", "href").await, "");
        assert!(!driver.click_element("button").await);
        assert!(!driver.wait_for_selector("div", Duration::from_millis(10)).await);
        assert!(!driver.health_check().await);
    }

    #[tokio::test]
    async fn navigation_before_initialize_is_a_typed_error() {
        let mut driver = CdpDriver::new(DriverSettings::default());
        let err = driver.navigate_to_url("https://example.com", 0).await.unwrap_err();
        assert!(matches!(err, DriverError::NotInitialized));
    }
}
