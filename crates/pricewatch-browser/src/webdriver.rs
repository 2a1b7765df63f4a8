//! WebDriver backend over fantoccini, for deployments that run a separate
//! chromedriver/geckodriver service instead of an in-process browser.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};

use crate::driver::{backoff_delay, BrowserDriver, DriverSettings};
use crate::error::DriverError;
use crate::launch::{launch_profiles, random_user_agent, ExecutionEnv, DEFAULT_ACCEPT_LANGUAGE};

/// One WebDriver session against a configured endpoint.
pub struct WebDriverSession {
    settings: DriverSettings,
    client: Option<Client>,
    user_agent: &'static str,
}

impl WebDriverSession {
    #[must_use]
    pub fn new(settings: DriverSettings) -> Self {
        Self {
            settings,
            client: None,
            user_agent: random_user_agent(),
        }
    }

    fn capabilities(&self, profile_args: &[&'static str]) -> serde_json::Map<String, serde_json::Value> {
        let mut args: Vec<String> = Vec::new();
        if self.settings.headless {
            args.push("--headless=new".to_string());
        }
        args.push(format!("--user-agent={}", self.user_agent));
        args.push(format!("--accept-lang={DEFAULT_ACCEPT_LANGUAGE}"));
        args.push(format!(
            "--window-size={},{}",
            self.settings.viewport.0, self.settings.viewport.1
        ));
        args.extend(profile_args.iter().map(|a| (*a).to_string()));

        let mut chrome_options = serde_json::Map::new();
        chrome_options.insert("args".to_string(), serde_json::json!(args));
        if let Some(binary) = &self.settings.chromium_binary {
            chrome_options.insert(
                "binary".to_string(),
                serde_json::json!(binary.display().to_string()),
            );
        }

        let mut capabilities = serde_json::Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            serde_json::Value::Object(chrome_options),
        );
        capabilities
    }
}

#[async_trait]
impl BrowserDriver for WebDriverSession {
    async fn initialize(&mut self) -> Result<(), DriverError> {
        let endpoint = self
            .settings
            .webdriver_url
            .clone()
            .ok_or_else(|| DriverError::Session("no webdriver endpoint configured".to_string()))?;

        let env = ExecutionEnv::detect();
        let profiles = launch_profiles(env, &self.settings);
        let attempts = profiles.len();
        let mut last_error = String::new();

        for profile in profiles {
            let mut builder = ClientBuilder::native();
            builder.capabilities(self.capabilities(&profile.args));
            match tokio::time::timeout(profile.launch_timeout, builder.connect(&endpoint)).await {
                Ok(Ok(client)) => {
                    tracing::debug!(
                        profile = profile.label,
                        endpoint = %endpoint,
                        user_agent = self.user_agent,
                        "webdriver session started"
                    );
                    self.client = Some(client);
                    return Ok(());
                }
                Ok(Err(e)) => {
                    tracing::warn!(profile = profile.label, error = %e, "webdriver connect failed, falling back");
                    last_error = e.to_string();
                }
                Err(_) => {
                    tracing::warn!(profile = profile.label, "webdriver connect timed out, falling back");
                    last_error = format!("connect timed out after {:?}", profile.launch_timeout);
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
        let client = self.client.as_mut().ok_or(DriverError::NotInitialized)?;

        let mut last_error = String::new();
        for attempt in 0..=max_retries {
            match tokio::time::timeout(timeout, client.goto(url)).await {
                Ok(Ok(())) => return Ok(()),
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
        let Some(client) = self.client.as_mut() else {
            return false;
        };
        client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .is_ok()
    }

    async fn extract_text(&mut self, selector: &str) -> String {
        let Some(client) = self.client.as_mut() else {
            return String::new();
        };
        match client.find(Locator::Css(selector)).await {
            Ok(element) => element
                .text()
                .await
                .map(|t| t.trim().to_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    async fn extract_text_multiple(&mut self, selector: &str) -> Vec<String> {
        let Some(client) = self.client.as_mut() else {
            return Vec::new();
        };
        let Ok(elements) = client.find_all(Locator::Css(selector)).await else {
            return Vec::new();
        };
        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            if let Ok(text) = element.text().await {
                let trimmed = text.trim().to_string();
                if !trimmed.is_empty() {
                    texts.push(trimmed);
                }
            }
        }
        texts
    }

    async fn extract_attribute(&mut self, selector: &str, attribute: &str) -> String {
        let Some(client) = self.client.as_mut() else {
            return String::new();
        };
        match client.find(Locator::Css(selector)).await {
            Ok(element) => element
                .attr(attribute)
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
        let Some(client) = self.client.as_mut() else {
            return Vec::new();
        };
        let Ok(elements) = client.find_all(Locator::Css(selector)).await else {
            return Vec::new();
        };
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            values.push(element.attr(attribute).await.ok().flatten().unwrap_or_default());
        }
        values
    }

    async fn click_element(&mut self, selector: &str) -> bool {
        let Some(client) = self.client.as_mut() else {
            return false;
        };
        match client.find(Locator::Css(selector)).await {
            Ok(element) => element.click().await.is_ok(),
            Err(_) => false,
        }
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> bool {
        let Some(client) = self.client.as_mut() else {
            return false;
        };
        match client.find(Locator::Css(selector)).await {
            Ok(element) => element.send_keys(text).await.is_ok(),
            Err(_) => false,
        }
    }

    async fn page_text(&mut self) -> String {
        let Some(client) = self.client.as_mut() else {
            return String::new();
        };
        match client.find(Locator::Css("body")).await {
            Ok(body) => body.text().await.unwrap_or_default(),
            Err(_) => String::new(),
        }
    }

    async fn screenshot(&mut self, path: &Path) -> Result<(), DriverError> {
        let client = self.client.as_mut().ok_or(DriverError::NotInitialized)?;
        let bytes = client
            .screenshot()
            .await
            .map_err(|e| DriverError::Screenshot(e.to_string()))?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| DriverError::Screenshot(format!("write {}: {e}", path.display())))?;
        Ok(())
    }

    async fn health_check(&mut self) -> bool {
        let Some(client) = self.client.as_mut() else {
            return false;
        };
        tokio::time::timeout(Duration::from_secs(10), client.goto("about:blank"))
            .await
            .map(|r| r.is_ok())
            .unwrap_or(false)
    }

    async fn cleanup(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.close().await {
                tracing::warn!(error = %e, "webdriver session close error during cleanup");
            }
        }
    }
}
