//! Weighted multi-signal product matching.

use pricewatch_core::{NormalizedProduct, PriceScrapingResult};
use rust_decimal::Decimal;

use crate::config::{MatcherConfig, PenaltyRule};
use crate::signals::{brand_size_signal, ean_signal, title_signal};
use crate::types::{ProductMatch, ScoredResult};

/// Scores scraped candidates against catalog products.
///
/// Configuration is runtime-mutable so scoring can be tuned while
/// scrapers keep running.
#[derive(Debug, Clone, Default)]
pub struct ProductMatcher {
    config: MatcherConfig,
}

impl ProductMatcher {
    #[must_use]
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: MatcherConfig) {
        self.config = config;
    }

    pub fn add_penalty_rule(&mut self, rule: PenaltyRule) {
        self.config.penalty_rules.push(rule);
    }

    /// Removes all rules with the given pattern. Returns whether any rule
    /// was removed.
    pub fn remove_penalty_rule(&mut self, pattern: &str) -> bool {
        let before = self.config.penalty_rules.len();
        self.config.penalty_rules.retain(|r| r.pattern != pattern);
        self.config.penalty_rules.len() != before
    }

    /// Scores and ranks `candidates` for `product`.
    ///
    /// Candidates at or below the configured minimum score are discarded
    /// entirely: they appear neither in `scraped_results` nor as
    /// `best_match`.
    #[must_use]
    pub fn find_matches(
        &self,
        product: &NormalizedProduct,
        candidates: Vec<PriceScrapingResult>,
    ) -> ProductMatch {
        let mut scored: Vec<ScoredResult> = candidates
            .into_iter()
            .filter_map(|result| {
                let score = self.score_candidate(product, &result.title);
                if score > self.config.min_score {
                    Some(ScoredResult { result, score })
                } else {
                    tracing::trace!(
                        supplier_product_id = %product.supplier_product_id,
                        title = %result.title,
                        score,
                        "candidate below threshold, discarded"
                    );
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        let best_match = scored.first().cloned();
        let confidence = best_match.as_ref().map_or(0.0, |b| b.score);
        let margin_opportunity_pct = best_match
            .as_ref()
            .and_then(|best| margin_opportunity(product.wholesale_price, best.result.price));

        ProductMatch {
            product: product.clone(),
            scraped_results: scored,
            best_match,
            confidence,
            margin_opportunity_pct,
        }
    }

    /// Weighted average over the signals that fired, minus title
    /// penalties, floored at zero.
    fn score_candidate(&self, product: &NormalizedProduct, candidate_title: &str) -> f64 {
        let mut weighted_sum = 0.0;
        let mut fired_weights = 0.0;

        if let Some(score) = ean_signal(product, candidate_title) {
            weighted_sum += score * self.config.ean_weight;
            fired_weights += self.config.ean_weight;
        }
        if let Some(score) = brand_size_signal(product, candidate_title) {
            weighted_sum += score * self.config.brand_size_weight;
            fired_weights += self.config.brand_size_weight;
        }
        if let Some(score) = title_signal(product, candidate_title) {
            weighted_sum += score * self.config.title_weight;
            fired_weights += self.config.title_weight;
        }

        if fired_weights <= 0.0 {
            return 0.0;
        }

        let base = weighted_sum / fired_weights;
        (base - self.config.penalty_for(candidate_title)).max(0.0)
    }
}

/// Percentage uplift from wholesale to the scraped retail price. `None`
/// unless both prices are positive.
fn margin_opportunity(wholesale: Decimal, retail: Decimal) -> Option<Decimal> {
    if wholesale <= Decimal::ZERO || retail <= Decimal::ZERO {
        return None;
    }
    Some((retail - wholesale) / wholesale * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
