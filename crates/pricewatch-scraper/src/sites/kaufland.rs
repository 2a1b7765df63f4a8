//! Kaufland marketplace scraper.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use pricewatch_browser::BrowserDriver;
use pricewatch_core::ScrapingSource;

use crate::error::ScrapeError;
use crate::site::{DetailSelectors, ProfileSelectors, ScraperCore, SiteProfile, SiteScraper};
use crate::types::RawListing;

fn search_url(base_url: &str, query: &str) -> String {
    let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
    format!("{}/s/?search_value={encoded}", base_url.trim_end_matches('/'))
}

fn profile() -> SiteProfile {
    SiteProfile {
        name: "kaufland",
        currency: "EUR",
        build_search_url: search_url,
        selectors: ProfileSelectors {
            result_container: &["article.product", "div.product-cell"],
            title: &["div.product__title", "a.product-link div.title"],
            price: &["div.price__amount", "div.product-price"],
            link: &["a.product__wrapper", "a.product-link"],
            availability: &["div.product__availability"],
            merchant: &["div.product__seller"],
        },
        detail: DetailSelectors {
            price: &["div.rd-buybox__price", "span.rd-buybox__price-value"],
            availability: &["div.rd-buybox__availability"],
            shipping: &["div.rd-buybox__shipping-info"],
            merchant: &["div.rd-buybox__merchant a"],
            ean: &["tr.rd-product-attribute--ean td.rd-product-attribute__value"],
        },
        availability_positive: &["auf lager", "lieferbar", "verfügbar"],
        default_merchant: None,
    }
}

pub struct KauflandScraper {
    core: ScraperCore,
}

impl KauflandScraper {
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
impl SiteScraper for KauflandScraper {
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
