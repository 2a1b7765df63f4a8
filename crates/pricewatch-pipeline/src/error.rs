use thiserror::Error;
use uuid::Uuid;

use crate::sinks::SinkError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("a scraping job is already in progress: {running_job_id}")]
    JobAlreadyInProgress { running_job_id: Uuid },

    #[error("job sink failure: {0}")]
    Sink(#[from] SinkError),
}
