use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::CurrencyError;

/// External rate provider abstraction, called by the rate-update batch.
/// Implementations typically wrap a public exchange-rate API; tests use
/// canned values.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Current rate for one currency pair.
    ///
    /// # Errors
    ///
    /// Returns [`CurrencyError::Source`] when the provider cannot deliver
    /// the pair; the batch logs and skips it.
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<Decimal, CurrencyError>;
}
