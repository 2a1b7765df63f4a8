//! The scraper contract and the shared DOM-extraction core.
//!
//! Each marketplace gets its own concrete scraper type (see
//! [`crate::sites`]), but the mechanics — rate gating, navigation,
//! anti-bot abort, candidate-selector fallback, row assembly — are the
//! same everywhere and live in [`ScraperCore`]. Site modules contribute a
//! [`SiteProfile`]: URL construction, default selector candidates, and
//! availability vocabulary.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use pricewatch_browser::BrowserDriver;
use pricewatch_core::ScrapingSource;

use crate::confidence::{is_plausible_ean, score_listing};
use crate::error::ScrapeError;
use crate::price::parse_price;
use crate::rate_limit::{RateGate, DEFAULT_DELAY_MS};
use crate::types::RawListing;

/// How long to wait for the first result row before concluding the search
/// came back empty.
const RESULT_WAIT: Duration = Duration::from_secs(10);

/// Contract implemented once per marketplace.
///
/// `search_products` and `scrape_product` never fail on per-listing
/// problems: unparsable rows are dropped, anti-bot interstitials and
/// exhausted navigation retries yield an empty result with a warning.
/// Errors surface only for broken sessions (failed launch, uninitialized
/// driver).
#[async_trait]
pub trait SiteScraper: Send {
    /// The source this scraper was built for.
    fn source(&self) -> &ScrapingSource;

    /// Launches the underlying browser session.
    ///
    /// # Errors
    ///
    /// Propagates [`ScrapeError::Driver`] when every launch profile fails.
    async fn initialize(&mut self) -> Result<(), ScrapeError>;

    /// Runs a search and returns all extractable listings.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Driver`] only for session-level failures.
    async fn search_products(&mut self, query: &str) -> Result<Vec<RawListing>, ScrapeError>;

    /// Runs a search and returns the top listing, enriched from its detail
    /// page when one exists.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Driver`] only for session-level failures.
    async fn scrape_product(&mut self, search_term: &str)
        -> Result<Option<RawListing>, ScrapeError>;

    /// Confirms the underlying session is still responsive.
    async fn health_check(&mut self) -> bool;

    /// Releases browser resources. Idempotent.
    async fn cleanup(&mut self);
}

/// Default selector candidates for one extracted field, in priority order.
pub(crate) type Candidates = &'static [&'static str];

pub(crate) struct ProfileSelectors {
    pub result_container: Candidates,
    pub title: Candidates,
    pub price: Candidates,
    pub link: Candidates,
    pub availability: Candidates,
    pub merchant: Candidates,
}

/// Selectors probed on a listing's own page during detail enrichment.
/// Empty lists skip the corresponding field.
pub(crate) struct DetailSelectors {
    pub price: Candidates,
    pub availability: Candidates,
    pub shipping: Candidates,
    pub merchant: Candidates,
    pub ean: Candidates,
}

/// Static description of one marketplace.
pub(crate) struct SiteProfile {
    pub name: &'static str,
    pub currency: &'static str,
    pub build_search_url: fn(base_url: &str, query: &str) -> String,
    pub selectors: ProfileSelectors,
    pub detail: DetailSelectors,
    /// Lowercase fragments that mark a listing as in stock.
    pub availability_positive: Candidates,
    /// Default merchant when the site sells first-party (e.g. Amazon
    /// retail) and no per-listing merchant is shown.
    pub default_merchant: Option<&'static str>,
}

/// Shared scraping engine: owns the driver, the rate gate, and the merged
/// (configured-over-default) selector candidates.
pub(crate) struct ScraperCore {
    source: ScrapingSource,
    driver: Box<dyn BrowserDriver>,
    gate: RateGate,
    profile: SiteProfile,
    nav_max_retries: u32,
}

impl ScraperCore {
    pub(crate) fn new(
        source: ScrapingSource,
        driver: Box<dyn BrowserDriver>,
        profile: SiteProfile,
        nav_max_retries: u32,
    ) -> Self {
        let delay_ms = source
            .config
            .request_delay_ms
            .unwrap_or(if source.rate_limit_ms > 0 {
                source.rate_limit_ms
            } else {
                DEFAULT_DELAY_MS
            });
        Self {
            source,
            driver,
            gate: RateGate::new(delay_ms),
            profile,
            nav_max_retries,
        }
    }

    pub(crate) fn source(&self) -> &ScrapingSource {
        &self.source
    }

    pub(crate) async fn initialize(&mut self) -> Result<(), ScrapeError> {
        self.driver.initialize().await?;
        Ok(())
    }

    pub(crate) async fn health_check(&mut self) -> bool {
        self.driver.health_check().await
    }

    pub(crate) async fn cleanup(&mut self) {
        self.driver.cleanup().await;
    }

    /// Admin-configured selectors win over the profile defaults.
    fn candidates(configured: &[String], default: Candidates) -> Vec<String> {
        if configured.is_empty() {
            default.iter().map(|s| (*s).to_string()).collect()
        } else {
            configured.to_vec()
        }
    }

    /// Tries each candidate selector in turn and accepts the first that
    /// yields any non-empty text.
    async fn first_text(&mut self, candidates: &[String]) -> String {
        for selector in candidates {
            let text = self.driver.extract_text(selector).await;
            if !text.is_empty() {
                return text;
            }
        }
        String::new()
    }

    /// Multi-element variant of the candidate fallback: the first selector
    /// producing a non-empty list wins.
    async fn first_text_list(&mut self, candidates: &[String]) -> Vec<String> {
        for selector in candidates {
            let texts = self.driver.extract_text_multiple(selector).await;
            if !texts.is_empty() {
                return texts;
            }
        }
        Vec::new()
    }

    async fn first_attr_list(&mut self, candidates: &[String], attribute: &str) -> Vec<String> {
        for selector in candidates {
            let values = self
                .driver
                .extract_attribute_multiple(selector, attribute)
                .await;
            if values.iter().any(|v| !v.is_empty()) {
                return values;
            }
        }
        Vec::new()
    }

    fn is_positive_availability(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.profile
            .availability_positive
            .iter()
            .any(|marker| lower.contains(marker))
    }

    /// Resolves a possibly relative listing link against the source's base
    /// URL. Unresolvable links yield an empty string, which later drops
    /// the row.
    fn resolve_link(&self, href: &str) -> String {
        if href.is_empty() {
            return String::new();
        }
        match url::Url::parse(&self.source.base_url).and_then(|base| base.join(href)) {
            Ok(resolved) => resolved.to_string(),
            Err(_) => String::new(),
        }
    }

    /// Navigates to a search results page and extracts every listing.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Driver`] for an uninitialized session; all
    /// per-page failures degrade to an empty result.
    pub(crate) async fn search(&mut self, query: &str) -> Result<Vec<RawListing>, ScrapeError> {
        self.gate.wait().await;

        let url = (self.profile.build_search_url)(&self.source.base_url, query);
        tracing::debug!(source = self.profile.name, %url, "searching");

        if let Err(e) = self.driver.navigate_to_url(&url, self.nav_max_retries).await {
            match e {
                pricewatch_browser::DriverError::Navigation { .. } => {
                    tracing::warn!(
                        source = self.profile.name,
                        query,
                        error = %e,
                        "search navigation failed, treating as no result"
                    );
                    return Ok(Vec::new());
                }
                other => return Err(other.into()),
            }
        }

        if self.driver.has_anti_bot_protection().await {
            tracing::warn!(
                source = self.profile.name,
                query,
                "anti-bot interstitial detected, aborting search"
            );
            return Ok(Vec::new());
        }

        let title_candidates =
            Self::candidates(&self.source.config.selectors.title, self.profile.selectors.title);
        let container_candidates = Self::candidates(
            &self.source.config.selectors.result_container,
            self.profile.selectors.result_container,
        );
        if let Some(container) = container_candidates.first() {
            self.driver.wait_for_selector(container, RESULT_WAIT).await;
        }

        let titles = self.first_text_list(&title_candidates).await;
        if titles.is_empty() {
            tracing::debug!(source = self.profile.name, query, "no result rows");
            return Ok(Vec::new());
        }

        let price_candidates =
            Self::candidates(&self.source.config.selectors.price, self.profile.selectors.price);
        let link_candidates =
            Self::candidates(&self.source.config.selectors.link, self.profile.selectors.link);
        let availability_candidates = Self::candidates(
            &self.source.config.selectors.availability,
            self.profile.selectors.availability,
        );
        let merchant_candidates = Self::candidates(
            &self.source.config.selectors.merchant,
            self.profile.selectors.merchant,
        );

        let prices = self.first_text_list(&price_candidates).await;
        let links = self.first_attr_list(&link_candidates, "href").await;
        let availabilities = self.first_text_list(&availability_candidates).await;
        let merchants = self.first_text_list(&merchant_candidates).await;

        let mut listings = Vec::new();
        for (i, title) in titles.iter().enumerate() {
            let Some(price) = prices.get(i).and_then(|p| parse_price(p)) else {
                continue;
            };
            let link = self.resolve_link(links.get(i).map(String::as_str).unwrap_or_default());
            if link.is_empty() {
                continue;
            }

            let availability_text = availabilities.get(i);
            let is_available = availability_text
                .map_or(true, |text| self.is_positive_availability(text));
            let merchant = merchants
                .get(i)
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .or_else(|| self.profile.default_merchant.map(str::to_string));

            let confidence = score_listing(
                title,
                Some(price),
                availability_text.is_some(),
                &link,
                None,
            );

            listings.push(RawListing {
                title: title.clone(),
                price,
                currency: self.profile.currency.to_string(),
                url: link,
                merchant,
                is_available,
                ean: None,
                shipping_cost: None,
                price_includes_vat: true,
                confidence,
            });
        }

        tracing::debug!(
            source = self.profile.name,
            query,
            rows = titles.len(),
            kept = listings.len(),
            "search extracted"
        );
        Ok(listings)
    }

    /// Returns the top search hit, enriched from its detail page where the
    /// profile defines detail selectors. Enrichment failures keep the
    /// search-page listing.
    pub(crate) async fn top_result(
        &mut self,
        search_term: &str,
    ) -> Result<Option<RawListing>, ScrapeError> {
        let mut listings = self.search(search_term).await?;
        if listings.is_empty() {
            return Ok(None);
        }
        let listing = listings.swap_remove(0);
        Ok(Some(self.enrich_from_detail_page(listing).await))
    }

    async fn enrich_from_detail_page(&mut self, mut listing: RawListing) -> RawListing {
        let detail = &self.profile.detail;
        let has_detail_selectors = !(detail.price.is_empty()
            && detail.availability.is_empty()
            && detail.shipping.is_empty()
            && detail.merchant.is_empty()
            && detail.ean.is_empty());
        if !has_detail_selectors {
            return listing;
        }

        self.gate.wait().await;
        let url = listing.url.clone();
        if self
            .driver
            .navigate_to_url(&url, self.nav_max_retries)
            .await
            .is_err()
        {
            tracing::debug!(source = self.profile.name, %url, "detail page unreachable, keeping search-page data");
            return listing;
        }
        if self.driver.has_anti_bot_protection().await {
            tracing::warn!(source = self.profile.name, %url, "anti-bot on detail page, keeping search-page data");
            return listing;
        }

        let price_cands: Vec<String> = detail.price.iter().map(|s| (*s).to_string()).collect();
        let avail_cands: Vec<String> =
            detail.availability.iter().map(|s| (*s).to_string()).collect();
        let shipping_cands: Vec<String> =
            detail.shipping.iter().map(|s| (*s).to_string()).collect();
        let merchant_cands: Vec<String> =
            detail.merchant.iter().map(|s| (*s).to_string()).collect();
        let ean_cands: Vec<String> = detail.ean.iter().map(|s| (*s).to_string()).collect();

        if let Some(price) = parse_price(&self.first_text(&price_cands).await) {
            listing.price = price;
        }

        let availability_text = self.first_text(&avail_cands).await;
        if !availability_text.is_empty() {
            listing.is_available = self.is_positive_availability(&availability_text);
        }

        let shipping_text = self.first_text(&shipping_cands).await;
        if let Some(shipping) = parse_price(&shipping_text) {
            listing.shipping_cost = Some(shipping);
        } else if shipping_text.to_lowercase().contains("kostenlos")
            || shipping_text.to_lowercase().contains("free")
        {
            listing.shipping_cost = Some(Decimal::ZERO);
        }

        let merchant = self.first_text(&merchant_cands).await;
        if !merchant.is_empty() {
            listing.merchant = Some(merchant);
        }

        let ean_text = self.first_text(&ean_cands).await;
        let ean_digits: String = ean_text.chars().filter(char::is_ascii_digit).collect();
        if is_plausible_ean(&ean_digits) {
            listing.ean = Some(ean_digits);
        }

        listing.confidence = score_listing(
            &listing.title,
            Some(listing.price),
            !availability_text.is_empty(),
            &listing.url,
            listing.ean.as_deref(),
        );

        listing
    }
}

#[cfg(test)]
#[path = "site_test.rs"]
mod tests;
