//! Google Shopping scraper.
//!
//! Result cards link out to third-party shops, so there is no usable
//! detail page; everything must come from the result grid. Domain filters
//! on the source configuration matter most here.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use pricewatch_browser::BrowserDriver;
use pricewatch_core::ScrapingSource;

use crate::error::ScrapeError;
use crate::site::{DetailSelectors, ProfileSelectors, ScraperCore, SiteProfile, SiteScraper};
use crate::types::RawListing;

fn search_url(base_url: &str, query: &str) -> String {
    let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
    format!(
        "{}/search?tbm=shop&hl=de&q={encoded}",
        base_url.trim_end_matches('/')
    )
}

fn profile() -> SiteProfile {
    SiteProfile {
        name: "google_shopping",
        currency: "EUR",
        build_search_url: search_url,
        selectors: ProfileSelectors {
            result_container: &["div.sh-dgr__grid-result", "div.sh-dlr__list-result"],
            title: &["h3.tAxDx", "h4.A2sOrd"],
            price: &["span.a8Pemb", "div.kHxwFf span"],
            link: &["a.shntl", "div.sh-dgr__grid-result a"],
            availability: &[],
            merchant: &["div.aULzUe", "div.IuHnof"],
        },
        // Cards link straight to external shops; no detail view exists.
        detail: DetailSelectors {
            price: &[],
            availability: &[],
            shipping: &[],
            merchant: &[],
            ean: &[],
        },
        availability_positive: &["auf lager", "in stock"],
        default_merchant: None,
    }
}

pub struct GoogleShoppingScraper {
    core: ScraperCore,
}

impl GoogleShoppingScraper {
    #[must_use]
    pub fn new(
        source: ScrapingSource,
        driver: Box<dyn BrowserDriver>,
        nav_max_retries: u32,
    ) -> Self {
        Self {
            core: ScraperCore::new(source, driver, profile(), nav_max_retries),
        }
    }
}

#[async_trait]
impl SiteScraper for GoogleShoppingScraper {
    fn source(&self) -> &ScrapingSource {
        self.core.source()
    }

    async fn initialize(&mut self) -> Result<(), ScrapeError> {
        self.core.initialize().await
    }

    async fn search_products(&mut self, query: &str) -> Result<Vec<RawListing>, ScrapeError> {
        self.core.search(query).await
    }

    async fn scrape_product(
        &mut self,
        search_term: &str,
    ) -> Result<Option<RawListing>, ScrapeError> {
        self.core.top_result(search_term).await
    }

    async fn health_check(&mut self) -> bool {
        self.core.health_check().await
    }

    async fn cleanup(&mut self) {
        self.core.cleanup().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_targets_shopping_tab() {
        let url = search_url("https://www.google.com", "Armani Code");
        assert_eq!(
            url,
            "https://www.google.com/search?tbm=shop&hl=de&q=Armani%20Code"
        );
    }
}
