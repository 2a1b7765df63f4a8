//! One scraper implementation per target marketplace.
//!
//! Construction goes through [`crate::factory::build_scraper`]; nothing
//! outside the factory should name these types directly.

mod amazon;
mod ebay;
mod google_shopping;
mod idealo;
mod kaufland;

pub use amazon::AmazonScraper;
pub use ebay::EbayScraper;
pub use google_shopping::GoogleShoppingScraper;
pub use idealo::IdealoScraper;
pub use kaufland::KauflandScraper;
