//! Persistence seams injected by the hosting application.
//!
//! The pipeline never talks to a database: every state transition and
//! every matched result goes through these traits, so the core stays
//! independent of storage technology.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use pricewatch_core::{JobStatus, JobUpdate, PriceScrapingResult};

/// Opaque failure from a sink implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Receives every job state transition and progress tick, in order.
#[async_trait]
pub trait JobSink: Send + Sync {
    /// Persist/broadcast a job update. Updates for one job are delivered
    /// strictly in order; implementations must not reorder them.
    ///
    /// # Errors
    ///
    /// A `SinkError` from a *status transition* fails the job; errors on
    /// pure progress ticks are also treated as fatal because a host that
    /// cannot record progress cannot record a terminal state either.
    async fn update_job(
        &self,
        job_id: Uuid,
        status: JobStatus,
        update: JobUpdate,
    ) -> Result<(), SinkError>;
}

/// Receives the ranked results for one successfully matched product.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Persist up to three results, cheapest first, for the product.
    ///
    /// # Errors
    ///
    /// A `SinkError` marks the product as failed; the job continues.
    async fn save_results(
        &self,
        supplier_product_id: &str,
        results: Vec<PriceScrapingResult>,
    ) -> Result<(), SinkError>;
}
