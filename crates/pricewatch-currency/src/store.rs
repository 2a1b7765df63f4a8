use async_trait::async_trait;
use chrono::NaiveDate;

use pricewatch_core::CurrencyRate;

use crate::error::CurrencyError;

/// Persistence seam for exchange rates. The hosting application provides
/// the implementation; the converter only reads through its cache and the
/// rate-update batch only writes.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// The most recent active rate for the pair, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CurrencyError::Store`] on backend failure.
    async fn latest_rate(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Option<CurrencyRate>, CurrencyError>;

    /// The rate effective on the given calendar day, if one was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`CurrencyError::Store`] on backend failure.
    async fn rate_on(
        &self,
        from: &str,
        to: &str,
        day: NaiveDate,
    ) -> Result<Option<CurrencyRate>, CurrencyError>;

    /// Inserts the rate, replacing an existing record for the same pair
    /// and calendar day.
    ///
    /// # Errors
    ///
    /// Returns [`CurrencyError::Store`] on backend failure.
    async fn upsert_rate(&self, rate: CurrencyRate) -> Result<(), CurrencyError>;
}
