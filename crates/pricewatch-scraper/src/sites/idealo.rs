//! Idealo price-comparison scraper.
//!
//! Idealo aggregates shop offers per product, so the search page already
//! carries a minimum price and the detail page lists per-shop offers with
//! shipping and availability.

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
        "{}/preisvergleich/MainSearchProductCategory.html?q={encoded}",
        base_url.trim_end_matches('/')
    )
}

fn profile() -> SiteProfile {
    SiteProfile {
        name: "idealo",
        currency: "EUR",
        build_search_url: search_url,
        selectors: ProfileSelectors {
            result_container: &["div.sr-resultList__item", "div.offerList-item"],
            title: &[
                "div.sr-productSummary__title",
                "div.offerList-item-description-title",
            ],
            price: &[
                "div.sr-detailedPriceInfo__price",
                "div.offerList-item-priceMin",
            ],
            link: &["a.sr-resultItemLink__link", "a.offerList-itemWrapper"],
            availability: &["div.sr-detailedPriceInfo__availability"],
            merchant: &["div.sr-productSummary__shopName"],
        },
        detail: DetailSelectors {
            price: &[
                "div.productOffers-listItemOfferPrice",
                "a.productOffers-listItemOfferLink strong",
            ],
            availability: &["div.productOffers-listItemOfferDeliveryStatus"],
            shipping: &["div.productOffers-listItemOfferShippingDetails"],
            merchant: &["a.productOffers-listItemOfferShopV2LogoLink"],
            ean: &["tr[data-gtin] td.datasheet-listItem__value"],
        },
        availability_positive: &["auf lager", "sofort lieferbar", "lieferbar", "verfügbar"],
        default_merchant: None,
    }
}

pub struct IdealoScraper {
    core: ScraperCore,
}

impl IdealoScraper {
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
impl SiteScraper for IdealoScraper {
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
