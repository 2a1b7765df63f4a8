use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One scraped candidate listing, tied to exactly one catalog product and
/// one scraping source. Created by a scraper, scored by the matcher,
/// persisted by the orchestrator's result sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceScrapingResult {
    pub id: Uuid,
    pub supplier_product_id: String,
    pub source_id: Uuid,
    /// Listing title exactly as scraped.
    pub title: String,
    pub merchant: Option<String>,
    /// Canonical listing URL.
    pub url: String,
    /// Scraped retail price. Exact decimal, never floating point.
    pub price: Decimal,
    pub currency: String,
    /// Whether the displayed price includes VAT. Consumer storefronts
    /// display gross prices, so this is normally `true`.
    pub price_includes_vat: bool,
    pub shipping_cost: Option<Decimal>,
    pub is_available: bool,
    /// Heuristic trust estimate in `0.0..=1.0`.
    pub confidence: f64,
    /// Set by the orchestrator on the cheapest surviving candidate for a
    /// product before persistence.
    pub is_lowest_price: bool,
    pub scraped_at: DateTime<Utc>,
    /// The scraping job this result was produced under.
    pub job_id: Uuid,
}

impl PriceScrapingResult {
    /// Total landed price: listing price plus shipping when known.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.price + self.shipping_cost.unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_result(price: Decimal, shipping: Option<Decimal>) -> PriceScrapingResult {
        PriceScrapingResult {
            id: Uuid::new_v4(),
            supplier_product_id: "SUP-001".to_string(),
            source_id: Uuid::new_v4(),
            title: "Chanel N°5 Eau de Parfum 100ml".to_string(),
            merchant: Some("parfumdreams".to_string()),
            url: "https://www.idealo.de/preisvergleich/OffersOfProduct/123".to_string(),
            price,
            currency: "EUR".to_string(),
            price_includes_vat: true,
            shipping_cost: shipping,
            is_available: true,
            confidence: 0.8,
            is_lowest_price: false,
            scraped_at: Utc::now(),
            job_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn total_price_without_shipping_is_price() {
        let result = make_result(dec!(89.99), None);
        assert_eq!(result.total_price(), dec!(89.99));
    }

    #[test]
    fn total_price_adds_shipping() {
        let result = make_result(dec!(89.99), Some(dec!(4.95)));
        assert_eq!(result.total_price(), dec!(94.94));
    }
}
