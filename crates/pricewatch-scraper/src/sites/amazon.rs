//! Amazon marketplace scraper.
//!
//! Search results carry no per-listing merchant, so listings default to
//! the platform itself; the detail page corrects this for marketplace
//! sellers and adds delivery information.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use pricewatch_browser::BrowserDriver;
use pricewatch_core::ScrapingSource;

use crate::error::ScrapeError;
use crate::site::{DetailSelectors, ProfileSelectors, ScraperCore, SiteProfile, SiteScraper};
use crate::types::RawListing;

fn search_url(base_url: &str, query: &str) -> String {
    let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
    format!("{}/s?k={encoded}", base_url.trim_end_matches('/'))
}

fn profile() -> SiteProfile {
    SiteProfile {
        name: "amazon",
        currency: "EUR",
        build_search_url: search_url,
        selectors: ProfileSelectors {
            result_container: &[
                "div.s-result-item[data-component-type='s-search-result']",
                "div.s-result-item",
            ],
            title: &["h2.a-size-base-plus span", "h2 a span", "span.a-text-normal"],
            price: &["span.a-price > span.a-offscreen", "span.a-price-whole"],
            link: &["h2 a.a-link-normal", "a.a-link-normal.s-no-outline"],
            availability: &["span.a-color-success", "div.a-row.a-size-base.a-color-secondary"],
            merchant: &[],
        },
        detail: DetailSelectors {
            price: &[
                "#corePrice_feature_div span.a-offscreen",
                "#priceblock_ourprice",
            ],
            availability: &["#availability span"],
            shipping: &["#deliveryBlockMessage", "#mir-layout-DELIVERY_BLOCK"],
            merchant: &["#sellerProfileTriggerId", "#merchant-info a"],
            ean: &[],
        },
        availability_positive: &["auf lager", "in stock", "lieferung", "delivery"],
        default_merchant: Some("Amazon"),
    }
}

pub struct AmazonScraper {
    core: ScraperCore,
}

impl AmazonScraper {
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
impl SiteScraper for AmazonScraper {
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
    fn search_url_uses_k_parameter() {
        let url = search_url("https://www.amazon.de", "Dior Sauvage 100ml");
        assert_eq!(url, "https://www.amazon.de/s?k=Dior%20Sauvage%20100ml");
    }
}
