use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use pricewatch_core::PriceScrapingResult;

/// A scrape-time candidate listing, before it is tied to a catalog product
/// and job. Produced by [`crate::SiteScraper`] implementations.
#[derive(Debug, Clone)]
pub struct RawListing {
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    pub url: String,
    pub merchant: Option<String>,
    pub is_available: bool,
    pub ean: Option<String>,
    pub shipping_cost: Option<Decimal>,
    pub price_includes_vat: bool,
    /// Single-listing heuristic score; see [`crate::confidence`].
    pub confidence: f64,
}

impl RawListing {
    /// Converts to a persistable result, stamping identity, ownership, and
    /// scrape time. `is_lowest_price` starts `false`; the orchestrator
    /// marks the cheapest sibling before persistence.
    #[must_use]
    pub fn into_result(
        self,
        supplier_product_id: &str,
        source_id: Uuid,
        job_id: Uuid,
    ) -> PriceScrapingResult {
        PriceScrapingResult {
            id: Uuid::new_v4(),
            supplier_product_id: supplier_product_id.to_string(),
            source_id,
            title: self.title,
            merchant: self.merchant,
            url: self.url,
            price: self.price,
            currency: self.currency,
            price_includes_vat: self.price_includes_vat,
            shipping_cost: self.shipping_cost,
            is_available: self.is_available,
            confidence: self.confidence,
            is_lowest_price: false,
            scraped_at: Utc::now(),
            job_id,
        }
    }
}

/// Checks a candidate URL's host against a source's domain filters.
///
/// Blocked domains always lose; when the allow list is non-empty the host
/// (or a parent domain of it) must appear there. Unparseable URLs are
/// rejected outright.
#[must_use]
pub fn host_allowed(candidate_url: &str, allowed: &[String], blocked: &[String]) -> bool {
    let Ok(parsed) = url::Url::parse(candidate_url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    let matches_domain = |domain: &String| {
        let domain = domain.trim_start_matches("www.");
        let host = host.trim_start_matches("www.");
        host == domain || host.ends_with(&format!(".{domain}"))
    };

    if blocked.iter().any(matches_domain) {
        return false;
    }
    if !allowed.is_empty() && !allowed.iter().any(matches_domain) {
        return false;
    }
    true
}
