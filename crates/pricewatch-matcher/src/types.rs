use pricewatch_core::{NormalizedProduct, PriceScrapingResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A candidate listing with its computed match score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredResult {
    pub result: PriceScrapingResult,
    /// Final weighted score after penalties, in `0.0..=1.0`.
    pub score: f64,
}

/// The matcher's verdict for one catalog product. Transient: recomputed
/// per scraping pass and never persisted as its own entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMatch {
    pub product: NormalizedProduct,
    /// Surviving candidates, sorted by score descending.
    pub scraped_results: Vec<ScoredResult>,
    /// The top-ranked candidate, absent when nothing cleared the
    /// minimum-score threshold.
    pub best_match: Option<ScoredResult>,
    /// Score of the best match, `0.0` without one.
    pub confidence: f64,
    /// `(best price − wholesale) / wholesale × 100`; present only with a
    /// best match at a positive price.
    pub margin_opportunity_pct: Option<Decimal>,
}
