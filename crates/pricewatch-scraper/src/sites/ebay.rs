//! eBay marketplace scraper.
//!
//! Item pages expose structured item specifics, which is the one place in
//! the source set where an EAN can be read directly.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use pricewatch_browser::BrowserDriver;
use pricewatch_core::ScrapingSource;

use crate::error::ScrapeError;
use crate::site::{DetailSelectors, ProfileSelectors, ScraperCore, SiteProfile, SiteScraper};
use crate::types::RawListing;

fn search_url(base_url: &str, query: &str) -> String {
    let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
    format!("{}/sch/i.html?_nkw={encoded}", base_url.trim_end_matches('/'))
}

fn profile() -> SiteProfile {
    SiteProfile {
        name: "ebay",
        currency: "EUR",
        build_search_url: search_url,
        selectors: ProfileSelectors {
            result_container: &["li.s-item", "div.srp-river-results li"],
            title: &["div.s-item__title span", "h3.s-item__title"],
            price: &["span.s-item__price"],
            link: &["a.s-item__link"],
            availability: &["span.s-item__availability"],
            merchant: &["span.s-item__seller-info-text"],
        },
        detail: DetailSelectors {
            price: &["div.x-price-primary span.ux-textspans", "#prcIsum"],
            availability: &["#qtySubTxt", "div.d-quantity__availability span"],
            shipping: &[
                "div.ux-labels-values--shipping span.ux-textspans--BOLD",
                "#fshippingCost",
            ],
            merchant: &[
                "div.x-sellercard-atf__info__about-seller a span",
                "span.mbg-nw",
            ],
            ean: &["div.ux-labels-values--ean span.ux-textspans"],
        },
        availability_positive: &["auf lager", "in stock", "verfügbar", "available", "sofort"],
        default_merchant: None,
    }
}

pub struct EbayScraper {
    core: ScraperCore,
}

impl EbayScraper {
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
impl SiteScraper for EbayScraper {
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
    fn search_url_uses_nkw_parameter() {
        let url = search_url("https://www.ebay.de", "Hugo Boss Bottled");
        assert_eq!(url, "https://www.ebay.de/sch/i.html?_nkw=Hugo%20Boss%20Bottled");
    }
}
