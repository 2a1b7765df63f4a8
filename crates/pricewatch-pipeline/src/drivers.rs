//! Glue between the app configuration, per-source settings, and the
//! browser-driver factory.

use std::time::Duration;

use pricewatch_browser::{build_driver, BrowserDriver, DriverSettings};
use pricewatch_core::{AppConfig, ScrapingSource};

/// Assembles backend-independent driver settings for one source:
/// process-level knobs come from the app config, headless flag and extra
/// headers from the source's scraping config.
#[must_use]
pub fn driver_settings(config: &AppConfig, source: &ScrapingSource) -> DriverSettings {
    DriverSettings {
        headless: source.config.headless,
        chromium_binary: config.chromium_binary.clone(),
        webdriver_url: config.webdriver_url.clone(),
        navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
        backoff_base: Duration::from_millis(config.navigation_backoff_base_ms),
        extra_headers: source.config.headers.clone(),
        viewport: (1_366, 768),
    }
}

/// Driver factory for [`crate::ScrapingManager::initialize_scrapers`]:
/// one fresh, isolated driver per source.
pub fn driver_factory(
    config: AppConfig,
) -> impl FnMut(&ScrapingSource) -> Box<dyn BrowserDriver> + Send {
    move |source| build_driver(driver_settings(&config, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricewatch_core::load_app_config_from_env;

    #[test]
    fn settings_combine_app_and_source_config() {
        let app_config = load_app_config_from_env().expect("defaults must load");
        let mut source = ScrapingSource {
            id: uuid::Uuid::new_v4(),
            name: "idealo".to_string(),
            base_url: "https://www.idealo.de".to_string(),
            country: "DE".to_string(),
            is_active: true,
            priority: 0,
            rate_limit_ms: 1200,
            config: pricewatch_core::SourceConfig::default(),
        };
        source.config.headless = false;
        source
            .config
            .headers
            .push(("X-Forwarded-For".to_string(), "10.0.0.1".to_string()));

        let settings = driver_settings(&app_config, &source);
        assert!(!settings.headless);
        assert_eq!(settings.extra_headers.len(), 1);
        assert_eq!(
            settings.navigation_timeout,
            Duration::from_secs(app_config.navigation_timeout_secs)
        );
    }
}
