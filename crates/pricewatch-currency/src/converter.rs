//! Currency conversion over a rate store, with caching and cross-rate
//! derivation.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::time::Duration;

use pricewatch_core::CurrencyRate;

use crate::cache::{RateCache, RateKey};
use crate::error::CurrencyError;
use crate::source::RateSource;
use crate::store::RateStore;

/// Currencies covered by the rate-update batch. Wholesale feeds and the
/// scraped marketplaces settle in these.
pub const SUPPORTED_CURRENCIES: &[&str] = &["EUR", "USD", "GBP", "CHF", "PLN", "CZK"];

/// Cross rates are derived through this currency when no direct or
/// inverse rate exists.
const BASE_CURRENCY: &str = "EUR";

/// Outcome of one rate-update batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSummary {
    pub updated: u32,
    pub failed: u32,
}

/// Converts amounts between currencies.
///
/// Reads go through an owned TTL cache; lookups fall back from direct
/// rate to inverse rate to a cross rate through [`BASE_CURRENCY`]. The
/// cache is process-wide state owned by this struct alone — safe under
/// the one-running-job model without extra synchronization.
pub struct CurrencyConverter {
    store: Arc<dyn RateStore>,
    cache: RateCache,
    /// Pause between pair fetches in [`Self::update_exchange_rates`].
    update_delay: Duration,
}

impl CurrencyConverter {
    #[must_use]
    pub fn new(store: Arc<dyn RateStore>) -> Self {
        Self {
            store,
            cache: RateCache::default(),
            update_delay: Duration::from_millis(1_000),
        }
    }

    #[must_use]
    pub fn with_settings(
        store: Arc<dyn RateStore>,
        cache_ttl: Duration,
        cache_max_entries: usize,
        update_delay: Duration,
    ) -> Self {
        Self {
            store,
            cache: RateCache::new(cache_ttl, cache_max_entries),
            update_delay,
        }
    }

    /// Converts `amount` from one currency to another, optionally at a
    /// historical date.
    ///
    /// # Errors
    ///
    /// Returns [`CurrencyError::RateNotFound`] when no rate can be found
    /// or derived, or [`CurrencyError::Store`] on backend failure.
    pub async fn convert(
        &mut self,
        amount: Decimal,
        from: &str,
        to: &str,
        date: Option<DateTime<Utc>>,
    ) -> Result<Decimal, CurrencyError> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(amount);
        }
        let rate = self.get_exchange_rate(from, to, date).await?;
        Ok(amount * rate)
    }

    /// Resolves the exchange rate for a pair, consulting the cache first.
    ///
    /// Historical dates are normalized to the calendar day; a missing
    /// historical rate falls back to the latest rate with a logged
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`CurrencyError::RateNotFound`] when neither a direct, an
    /// inverse, nor a base-currency cross rate exists, or
    /// [`CurrencyError::Store`] on backend failure.
    pub async fn get_exchange_rate(
        &mut self,
        from: &str,
        to: &str,
        date: Option<DateTime<Utc>>,
    ) -> Result<Decimal, CurrencyError> {
        let from = from.to_uppercase();
        let to = to.to_uppercase();
        if from == to {
            return Ok(Decimal::ONE);
        }

        let day = date.map(|d| d.date_naive());
        let key: RateKey = (from.clone(), to.clone(), day);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let rate = match self.lookup_pair(&from, &to, day).await? {
            Some(rate) => Some(rate),
            None => self.derive_cross_rate(&from, &to).await?,
        };

        match rate {
            Some(rate) => {
                self.cache.insert(key, rate);
                Ok(rate)
            }
            None => Err(CurrencyError::RateNotFound { from, to }),
        }
    }

    /// Direct lookup, then inverse. Historical days fall back to the
    /// latest rate when no record exists for the exact day.
    async fn lookup_pair(
        &self,
        from: &str,
        to: &str,
        day: Option<NaiveDate>,
    ) -> Result<Option<Decimal>, CurrencyError> {
        if let Some(day) = day {
            if let Some(rate) = self.store.rate_on(from, to, day).await? {
                return Ok(Some(rate.rate));
            }
            tracing::warn!(
                from,
                to,
                %day,
                "no exchange rate recorded for that day, falling back to latest"
            );
        }

        if let Some(rate) = self.store.latest_rate(from, to).await? {
            return Ok(Some(rate.rate));
        }

        if let Some(inverse) = self.store.latest_rate(to, from).await? {
            if let Some(inverted) = inverse.inverted() {
                return Ok(Some(inverted.rate));
            }
        }

        Ok(None)
    }

    /// `from -> to` through the base currency:
    /// `rate(base, to) / rate(base, from)`.
    async fn derive_cross_rate(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Option<Decimal>, CurrencyError> {
        if from == BASE_CURRENCY || to == BASE_CURRENCY {
            return Ok(None);
        }

        let Some(base_to) = self.lookup_pair(BASE_CURRENCY, to, None).await? else {
            return Ok(None);
        };
        let Some(base_from) = self.lookup_pair(BASE_CURRENCY, from, None).await? else {
            return Ok(None);
        };
        if base_from.is_zero() {
            return Ok(None);
        }

        tracing::debug!(from, to, "derived cross rate via {BASE_CURRENCY}");
        Ok(Some(base_to / base_from))
    }

    /// Refreshes every ordered pair of the supported set from an external
    /// source. Per-pair failures are logged and skipped; the cache is
    /// cleared afterwards so stale entries cannot shadow fresh rates.
    pub async fn update_exchange_rates(&mut self, source: &dyn RateSource) -> UpdateSummary {
        let mut summary = UpdateSummary {
            updated: 0,
            failed: 0,
        };

        for from in SUPPORTED_CURRENCIES.iter().copied() {
            for to in SUPPORTED_CURRENCIES.iter().copied() {
                if from == to {
                    continue;
                }

                match source.fetch_rate(from, to).await {
                    Ok(rate) => {
                        let record = CurrencyRate {
                            from_currency: from.to_string(),
                            to_currency: to.to_string(),
                            rate,
                            effective_date: Utc::now(),
                            source: "external".to_string(),
                            is_active: true,
                        };
                        match self.store.upsert_rate(record).await {
                            Ok(()) => summary.updated += 1,
                            Err(e) => {
                                tracing::warn!(from, to, error = %e, "failed to persist rate");
                                summary.failed += 1;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(from, to, error = %e, "rate fetch failed, skipping pair");
                        summary.failed += 1;
                    }
                }

                if !self.update_delay.is_zero() {
                    tokio::time::sleep(self.update_delay).await;
                }
            }
        }

        self.cache.clear();
        tracing::info!(
            updated = summary.updated,
            failed = summary.failed,
            "exchange-rate update batch finished"
        );
        summary
    }
}

#[cfg(test)]
#[path = "converter_test.rs"]
mod tests;
