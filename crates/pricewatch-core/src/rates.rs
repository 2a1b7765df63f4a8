use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An exchange rate between two currencies, effective from a given date.
/// Seeded and refreshed by the rate-update batch; read (with caching) by
/// the converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    pub effective_date: DateTime<Utc>,
    /// Where the rate came from, e.g. `"ecb"` or `"manual"`.
    pub source: String,
    pub is_active: bool,
}

impl CurrencyRate {
    /// Returns the inverse rate (`to → from`), or `None` when the rate is
    /// zero and cannot be inverted.
    #[must_use]
    pub fn inverted(&self) -> Option<CurrencyRate> {
        if self.rate.is_zero() {
            return None;
        }
        Some(CurrencyRate {
            from_currency: self.to_currency.clone(),
            to_currency: self.from_currency.clone(),
            rate: Decimal::ONE / self.rate,
            effective_date: self.effective_date,
            source: self.source.clone(),
            is_active: self.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_rate(rate: Decimal) -> CurrencyRate {
        CurrencyRate {
            from_currency: "EUR".to_string(),
            to_currency: "USD".to_string(),
            rate,
            effective_date: Utc::now(),
            source: "test".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn inverted_swaps_pair_and_reciprocates() {
        let inverted = make_rate(dec!(1.25)).inverted().unwrap();
        assert_eq!(inverted.from_currency, "USD");
        assert_eq!(inverted.to_currency, "EUR");
        assert_eq!(inverted.rate, dec!(0.8));
    }

    #[test]
    fn inverted_zero_rate_is_none() {
        assert!(make_rate(Decimal::ZERO).inverted().is_none());
    }
}
