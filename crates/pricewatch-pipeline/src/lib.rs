pub mod drivers;
pub mod error;
pub mod manager;
pub mod search_terms;
pub mod sinks;

pub use drivers::{driver_factory, driver_settings};
pub use error::PipelineError;
pub use manager::ScrapingManager;
pub use search_terms::build_search_terms;
pub use sinks::{JobSink, ResultSink, SinkError};
