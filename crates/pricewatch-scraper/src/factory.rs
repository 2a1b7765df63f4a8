//! Central name → scraper constructor table.
//!
//! All per-site dispatch lives here so adding a marketplace touches one
//! match arm instead of branches scattered through the orchestrator.

use pricewatch_browser::BrowserDriver;
use pricewatch_core::ScrapingSource;

use crate::error::ScrapeError;
use crate::site::SiteScraper;
use crate::sites::{
    AmazonScraper, EbayScraper, GoogleShoppingScraper, IdealoScraper, KauflandScraper,
};

/// Source names with a scraper implementation, lowercase.
pub const SUPPORTED_SOURCES: &[&str] =
    &["idealo", "amazon", "ebay", "google_shopping", "kaufland"];

/// Returns the supported source names.
#[must_use]
pub fn supported_sources() -> &'static [&'static str] {
    SUPPORTED_SOURCES
}

/// Builds the scraper implementation registered for `source.name`.
///
/// Matching is case-insensitive; `nav_max_retries` is the per-navigation
/// retry budget from the job configuration.
///
/// # Errors
///
/// Returns [`ScrapeError::UnsupportedSource`] for names without an
/// implementation.
pub fn build_scraper(
    source: ScrapingSource,
    driver: Box<dyn BrowserDriver>,
    nav_max_retries: u32,
) -> Result<Box<dyn SiteScraper>, ScrapeError> {
    match source.name.to_lowercase().as_str() {
        "idealo" => Ok(Box::new(IdealoScraper::new(source, driver, nav_max_retries))),
        "amazon" => Ok(Box::new(AmazonScraper::new(source, driver, nav_max_retries))),
        "ebay" => Ok(Box::new(EbayScraper::new(source, driver, nav_max_retries))),
        "google_shopping" => Ok(Box::new(GoogleShoppingScraper::new(
            source,
            driver,
            nav_max_retries,
        ))),
        "kaufland" => Ok(Box::new(KauflandScraper::new(
            source,
            driver,
            nav_max_retries,
        ))),
        _ => Err(ScrapeError::UnsupportedSource {
            name: source.name.clone(),
        }),
    }
}
