pub mod config;
pub mod matcher;
pub mod signals;
pub mod similarity;
pub mod size;
pub mod types;

pub use config::{MatcherConfig, PenaltyRule};
pub use matcher::ProductMatcher;
pub use types::{ProductMatch, ScoredResult};
