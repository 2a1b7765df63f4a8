pub mod confidence;
pub mod error;
pub mod factory;
pub mod price;
pub mod rate_limit;
pub mod site;
pub mod sites;
pub mod types;

pub use error::ScrapeError;
pub use factory::{build_scraper, supported_sources};
pub use site::SiteScraper;
pub use types::RawListing;
