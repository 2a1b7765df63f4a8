use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-level configuration for the scraping pipeline, read from
/// environment variables. Per-job knobs live in
/// [`crate::jobs::JobConfig`]; these are the host-level defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Path to the admin-maintained source catalog YAML.
    pub sources_path: PathBuf,
    /// Dedicated lightweight Chromium binary for constrained environments.
    pub chromium_binary: Option<PathBuf>,
    /// WebDriver endpoint for the fantoccini backend, when one is running.
    pub webdriver_url: Option<String>,
    pub navigation_timeout_secs: u64,
    pub navigation_max_retries: u32,
    /// Base delay for linear navigation backoff: attempt × base.
    pub navigation_backoff_base_ms: u64,
    /// Default inter-request delay per scraper; sources may override.
    pub scrape_delay_ms: u64,
    pub batch_size: usize,
    pub delay_between_batches_ms: u64,
    pub rate_cache_ttl_secs: u64,
    /// Pause between pair fetches in the rate-update batch.
    pub rate_update_delay_ms: u64,
}
