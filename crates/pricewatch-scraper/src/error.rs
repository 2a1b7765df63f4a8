use thiserror::Error;

use pricewatch_browser::DriverError;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("browser driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("no scraper implementation for source \"{name}\"")]
    UnsupportedSource { name: String },
}
