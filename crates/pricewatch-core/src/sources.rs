use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;

/// A configured target marketplace. Created and edited by administrators,
/// read-only to the pipeline for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingSource {
    pub id: Uuid,
    /// Stable lookup name, e.g. `"idealo"`. Matched by the scraper factory.
    pub name: String,
    pub base_url: String,
    /// ISO 3166-1 alpha-2 country the marketplace serves, e.g. `"DE"`.
    pub country: String,
    pub is_active: bool,
    /// Higher priority sources are scraped first.
    pub priority: i32,
    /// Minimum delay between scraping operations against this source.
    pub rate_limit_ms: u64,
    pub config: SourceConfig,
}

/// Per-site scraping configuration: selector candidates, headers, and
/// domain filters. Site markup changes frequently, so every field carries
/// an ordered list of candidate selectors rather than a single one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub selectors: SelectorSet,
    /// Extra request headers sent with every navigation.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Overrides the source-level `rate_limit_ms` when set.
    #[serde(default)]
    pub request_delay_ms: Option<u64>,
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// When non-empty, result URLs must resolve to one of these hosts.
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    /// Result URLs resolving to these hosts are always rejected.
    #[serde(default)]
    pub blocked_domains: Vec<String>,
}

fn default_headless() -> bool {
    true
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            selectors: SelectorSet::default(),
            headers: Vec::new(),
            request_delay_ms: None,
            headless: true,
            allowed_domains: Vec::new(),
            blocked_domains: Vec::new(),
        }
    }
}

/// Ordered candidate CSS selectors per extracted field. Extraction tries
/// each candidate in turn and accepts the first that yields non-empty text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectorSet {
    #[serde(default)]
    pub result_container: Vec<String>,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub price: Vec<String>,
    #[serde(default)]
    pub link: Vec<String>,
    #[serde(default)]
    pub availability: Vec<String>,
    #[serde(default)]
    pub merchant: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<ScrapingSource>,
}

/// Load and validate the source catalog from a YAML file.
///
/// Inactive sources are retained in the returned list; the pipeline skips
/// them at job start so that toggling a source does not require a reload.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation (empty/duplicate names, blank base URL).
pub fn load_sources(path: &Path) -> Result<Vec<ScrapingSource>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourceFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile = serde_yaml::from_str(&content)?;
    validate_sources(&sources_file.sources)?;

    Ok(sources_file.sources)
}

fn validate_sources(sources: &[ScrapingSource]) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for source in sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if source.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{}' has an empty base_url",
                source.name
            )));
        }

        let lower_name = source.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_source(name: &str) -> ScrapingSource {
        ScrapingSource {
            id: Uuid::new_v4(),
            name: name.to_string(),
            base_url: "https://www.idealo.de".to_string(),
            country: "DE".to_string(),
            is_active: true,
            priority: 10,
            rate_limit_ms: 1200,
            config: SourceConfig::default(),
        }
    }

    #[test]
    fn validate_accepts_distinct_sources() {
        let sources = vec![make_source("idealo"), make_source("amazon")];
        assert!(validate_sources(&sources).is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_names_case_insensitive() {
        let sources = vec![make_source("idealo"), make_source("Idealo")];
        let err = validate_sources(&sources).unwrap_err();
        assert!(err.to_string().contains("duplicate source name"));
    }

    #[test]
    fn validate_rejects_empty_name() {
        let sources = vec![make_source("  ")];
        assert!(validate_sources(&sources).is_err());
    }

    #[test]
    fn validate_rejects_empty_base_url() {
        let mut source = make_source("idealo");
        source.base_url = String::new();
        assert!(validate_sources(&[source]).is_err());
    }

    #[test]
    fn source_config_defaults_to_headless() {
        let yaml = "selectors: {}\n";
        let config: SourceConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.headless);
        assert!(config.allowed_domains.is_empty());
        assert!(config.request_delay_ms.is_none());
    }

    #[test]
    fn selector_set_deserializes_candidate_lists_in_order() {
        let yaml = r"
title:
  - 'h2.product-title'
  - '.result-title a'
price:
  - '.price-main'
";
        let selectors: SelectorSet = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(selectors.title.len(), 2);
        assert_eq!(selectors.title[0], "h2.product-title");
        assert_eq!(selectors.price, vec![".price-main"]);
        assert!(selectors.merchant.is_empty());
    }
}
