pub mod app_config;
pub mod config;
pub mod error;
pub mod jobs;
pub mod products;
pub mod rates;
pub mod results;
pub mod sources;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use jobs::{JobConfig, JobStatus, JobUpdate, ScrapingJob};
pub use products::NormalizedProduct;
pub use rates::CurrencyRate;
pub use results::PriceScrapingResult;
pub use sources::{load_sources, ScrapingSource, SelectorSet, SourceConfig};
