use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a scraping job.
///
/// `Pending → Running → {Completed | Failed | Stopped}`. The orchestrator
/// is the only writer; scrapers and the matcher never touch job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl JobStatus {
    /// Terminal states cannot transition further.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Stopped
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Stopped => "stopped",
        };
        write!(f, "{s}")
    }
}

/// Tuning knobs for one scraping job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Sources to scrape, by id. Sources missing from the registry at run
    /// time are skipped.
    pub source_ids: Vec<Uuid>,
    pub batch_size: usize,
    pub delay_between_batches_ms: u64,
    /// Navigation retry budget handed to the browser driver.
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            source_ids: Vec::new(),
            batch_size: 10,
            delay_between_batches_ms: 2_000,
            max_retries: 3,
            timeout_secs: 30,
        }
    }
}

/// The unit of orchestration: one pass of the product catalog over the
/// configured sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingJob {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: JobStatus,
    /// Restricts the run to one supplier's products when set.
    pub supplier_filter: Option<String>,
    pub total_products: u32,
    pub processed_products: u32,
    pub successful_products: u32,
    pub failed_products: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub config: JobConfig,
}

impl ScrapingJob {
    /// Creates a pending job with zeroed counters.
    #[must_use]
    pub fn new(name: impl Into<String>, config: JobConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            status: JobStatus::Pending,
            supplier_filter: None,
            total_products: 0,
            processed_products: 0,
            successful_products: 0,
            failed_products: 0,
            started_at: None,
            completed_at: None,
            error_message: None,
            config,
        }
    }
}

/// Partial field set delivered to the job sink on every state transition
/// and progress tick. Absent fields are unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobUpdate {
    pub total_products: Option<u32>,
    pub processed_products: Option<u32>,
    pub successful_products: Option<u32>,
    pub failed_products: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}
