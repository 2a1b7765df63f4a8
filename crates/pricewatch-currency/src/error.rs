use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurrencyError {
    #[error("no exchange rate available for {from} -> {to}")]
    RateNotFound { from: String, to: String },

    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("rate store error: {0}")]
    Store(String),

    #[error("rate source error for {from} -> {to}: {reason}")]
    Source {
        from: String,
        to: String,
        reason: String,
    },
}
