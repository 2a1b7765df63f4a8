//! The scraping manager: job lifecycle, scraper registry, batching, and
//! result persistence.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use pricewatch_browser::BrowserDriver;
use pricewatch_core::{
    JobStatus, JobUpdate, NormalizedProduct, PriceScrapingResult, ScrapingJob, ScrapingSource,
};
use pricewatch_matcher::ProductMatcher;
use pricewatch_scraper::{build_scraper, types::host_allowed, SiteScraper};

use crate::error::PipelineError;
use crate::search_terms::build_search_terms;
use crate::sinks::{JobSink, ResultSink};

/// Pause between scraper initializations; constrained environments choke
/// on several simultaneous browser launches.
const INIT_STAGGER: Duration = Duration::from_millis(250);

/// How many results are persisted per matched product.
const RESULTS_PER_PRODUCT: usize = 3;

/// Identity of the currently running job plus its cooperative stop flag.
struct RunningJob {
    job_id: Uuid,
    stop_requested: AtomicBool,
}

/// Orchestrates one scraping job at a time.
///
/// The manager owns the scraper registry for the lifetime of a job and
/// tears it down at job end; persistence happens exclusively through the
/// injected [`JobSink`] and [`ResultSink`].
///
/// Cancellation is cooperative: [`Self::stop_job`] transitions the job
/// and sets a flag that the batch loop polls between products and
/// batches. In-flight browser operations complete naturally, so callers
/// must not assume sub-second cancellation latency.
pub struct ScrapingManager {
    job_sink: Arc<dyn JobSink>,
    result_sink: Arc<dyn ResultSink>,
    matcher: ProductMatcher,
    scrapers: Mutex<HashMap<Uuid, Box<dyn SiteScraper>>>,
    running: std::sync::Mutex<Option<Arc<RunningJob>>>,
}

/// Counter snapshot for progress reporting.
#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    processed: u32,
    successful: u32,
    failed: u32,
}

impl Counters {
    fn as_update(self) -> JobUpdate {
        JobUpdate {
            processed_products: Some(self.processed),
            successful_products: Some(self.successful),
            failed_products: Some(self.failed),
            ..JobUpdate::default()
        }
    }
}

impl ScrapingManager {
    #[must_use]
    pub fn new(
        job_sink: Arc<dyn JobSink>,
        result_sink: Arc<dyn ResultSink>,
        matcher: ProductMatcher,
    ) -> Self {
        Self {
            job_sink,
            result_sink,
            matcher,
            scrapers: Mutex::new(HashMap::new()),
            running: std::sync::Mutex::new(None),
        }
    }

    /// Builds and initializes one scraper per active source, registering
    /// them by source id. A failing source is logged and skipped — one
    /// broken site must not block the others. Returns the number of
    /// scrapers ready.
    pub async fn initialize_scrapers<F>(
        &self,
        sources: &[ScrapingSource],
        nav_max_retries: u32,
        mut make_driver: F,
    ) -> usize
    where
        F: FnMut(&ScrapingSource) -> Box<dyn BrowserDriver> + Send,
    {
        let mut registry = self.scrapers.lock().await;
        let mut ready = 0usize;

        for source in sources.iter().filter(|s| s.is_active) {
            let driver = make_driver(source);
            let mut scraper = match build_scraper(source.clone(), driver, nav_max_retries) {
                Ok(scraper) => scraper,
                Err(e) => {
                    tracing::warn!(source = %source.name, error = %e, "no scraper for source, skipping");
                    continue;
                }
            };

            match scraper.initialize().await {
                Ok(()) => {
                    tracing::info!(source = %source.name, "scraper initialized");
                    registry.insert(source.id, scraper);
                    ready += 1;
                }
                Err(e) => {
                    tracing::warn!(source = %source.name, error = %e, "scraper initialization failed, skipping source");
                    scraper.cleanup().await;
                }
            }

            tokio::time::sleep(INIT_STAGGER).await;
        }

        ready
    }

    /// Registers a pre-built scraper, keyed by its source id. Lets hosts
    /// plug in implementations beyond the built-in factory set.
    pub async fn register_scraper(&self, scraper: Box<dyn SiteScraper>) {
        let mut registry = self.scrapers.lock().await;
        registry.insert(scraper.source().id, scraper);
    }

    #[must_use]
    pub fn is_job_running(&self) -> bool {
        self.running.lock().expect("running lock poisoned").is_some()
    }

    #[must_use]
    pub fn running_job_id(&self) -> Option<Uuid> {
        self.running
            .lock()
            .expect("running lock poisoned")
            .as_ref()
            .map(|r| r.job_id)
    }

    /// Cooperatively stops the running job: marks it `Stopped` with a
    /// completion timestamp and clears the running state. The batch loop
    /// observes the flag between products/batches; an in-flight scrape
    /// completes naturally. Returns `false` when no job is running.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Sink`] when the stop transition cannot be
    /// persisted; the stop flag is set regardless.
    pub async fn stop_job(&self) -> Result<bool, PipelineError> {
        let running = {
            let mut guard = self.running.lock().expect("running lock poisoned");
            guard.take()
        };
        let Some(running) = running else {
            return Ok(false);
        };

        running.stop_requested.store(true, Ordering::SeqCst);
        tracing::info!(job_id = %running.job_id, "stop requested");

        self.job_sink
            .update_job(
                running.job_id,
                JobStatus::Stopped,
                JobUpdate {
                    completed_at: Some(Utc::now()),
                    ..JobUpdate::default()
                },
            )
            .await?;
        Ok(true)
    }

    /// Polls every registered scraper's health check. A failing source
    /// does not affect the others.
    pub async fn get_scraper_health(&self) -> HashMap<Uuid, bool> {
        let mut registry = self.scrapers.lock().await;
        let mut health = HashMap::with_capacity(registry.len());
        for (source_id, scraper) in registry.iter_mut() {
            let healthy = scraper.health_check().await;
            health.insert(*source_id, healthy);
        }
        health
    }

    /// Runs a scraping job over the product catalog.
    ///
    /// Products are processed sequentially in fixed-size batches; within a
    /// product, scrapers run sequentially in source-priority order, each
    /// trying the search-term variants until one yields a result.
    /// Surviving matches are persisted cheapest-first (top three, the
    /// cheapest flagged `is_lowest_price`).
    ///
    /// On return — success, failure, or stop — all scraper resources have
    /// been released and the running state cleared.
    ///
    /// # Errors
    ///
    /// [`PipelineError::JobAlreadyInProgress`] when a job is running
    /// (the running job is untouched). [`PipelineError::Sink`] when the
    /// job sink fails; the job is marked `Failed` best-effort first.
    pub async fn start_scraping_job(
        &self,
        job: ScrapingJob,
        products: Vec<NormalizedProduct>,
    ) -> Result<(), PipelineError> {
        let running = {
            let mut guard = self.running.lock().expect("running lock poisoned");
            if let Some(existing) = guard.as_ref() {
                return Err(PipelineError::JobAlreadyInProgress {
                    running_job_id: existing.job_id,
                });
            }
            let running = Arc::new(RunningJob {
                job_id: job.id,
                stop_requested: AtomicBool::new(false),
            });
            *guard = Some(Arc::clone(&running));
            running
        };

        // Honor the job's supplier scope before anything is counted.
        let products: Vec<NormalizedProduct> = match &job.supplier_filter {
            Some(supplier) => products
                .into_iter()
                .filter(|p| &p.supplier_name == supplier)
                .collect(),
            None => products,
        };

        tracing::info!(
            job_id = %job.id,
            job_name = %job.name,
            products = products.len(),
            batch_size = job.config.batch_size,
            "starting scraping job"
        );

        let result = self.run_job(&job, &products, &running).await;

        // Resources are released on every path, and released exactly once.
        self.cleanup_scrapers().await;
        self.clear_running_if_current(&running);

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "scraping job failed");
                let failed_update = JobUpdate {
                    completed_at: Some(Utc::now()),
                    error_message: Some(e.to_string()),
                    ..JobUpdate::default()
                };
                if let Err(sink_err) = self
                    .job_sink
                    .update_job(job.id, JobStatus::Failed, failed_update)
                    .await
                {
                    tracing::error!(
                        job_id = %job.id,
                        error = %sink_err,
                        "failed to record job failure"
                    );
                }
                Err(e)
            }
        }
    }

    async fn run_job(
        &self,
        job: &ScrapingJob,
        products: &[NormalizedProduct],
        running: &RunningJob,
    ) -> Result<(), PipelineError> {
        #[allow(clippy::cast_possible_truncation)]
        let total = products.len() as u32;
        self.job_sink
            .update_job(
                job.id,
                JobStatus::Running,
                JobUpdate {
                    total_products: Some(total),
                    started_at: Some(Utc::now()),
                    ..Counters::default().as_update()
                },
            )
            .await?;

        let batch_size = job.config.batch_size.max(1);
        let batch_count = products.len().div_ceil(batch_size);
        let mut counters = Counters::default();

        let mut registry = self.scrapers.lock().await;
        let scraper_order = Self::scraper_order(&registry, job);
        if scraper_order.is_empty() {
            tracing::warn!(job_id = %job.id, "no initialized scrapers match the job's sources");
        }

        for (batch_index, batch) in products.chunks(batch_size).enumerate() {
            if running.stop_requested.load(Ordering::SeqCst) {
                tracing::info!(job_id = %job.id, "stop observed before batch, ending job");
                return Ok(());
            }

            tracing::info!(
                job_id = %job.id,
                batch = batch_index + 1,
                batches = batch_count,
                "processing batch"
            );

            for product in batch {
                if running.stop_requested.load(Ordering::SeqCst) {
                    tracing::info!(job_id = %job.id, "stop observed mid-batch, ending job");
                    return Ok(());
                }

                let succeeded = self
                    .process_product(&mut registry, &scraper_order, job, product)
                    .await;
                counters.processed += 1;
                if succeeded {
                    counters.successful += 1;
                } else {
                    counters.failed += 1;
                }
            }

            // A stop may have landed while the last product was in
            // flight; the Stopped transition must stay the final update.
            if running.stop_requested.load(Ordering::SeqCst) {
                return Ok(());
            }

            // Progress for batch N is reported before batch N+1 begins.
            self.job_sink
                .update_job(job.id, JobStatus::Running, counters.as_update())
                .await?;

            let is_last = batch_index + 1 == batch_count;
            if !is_last && job.config.delay_between_batches_ms > 0 {
                tokio::time::sleep(Duration::from_millis(job.config.delay_between_batches_ms))
                    .await;
            }
        }

        if running.stop_requested.load(Ordering::SeqCst) {
            return Ok(());
        }

        let completed_update = JobUpdate {
            completed_at: Some(Utc::now()),
            ..counters.as_update()
        };
        self.job_sink
            .update_job(job.id, JobStatus::Completed, completed_update)
            .await?;
        tracing::info!(
            job_id = %job.id,
            processed = counters.processed,
            successful = counters.successful,
            failed = counters.failed,
            "scraping job completed"
        );
        Ok(())
    }

    /// Registered scrapers eligible for this job, highest priority first.
    fn scraper_order(
        registry: &HashMap<Uuid, Box<dyn SiteScraper>>,
        job: &ScrapingJob,
    ) -> Vec<Uuid> {
        let mut eligible: Vec<(Uuid, i32)> = registry
            .iter()
            .filter(|(id, _)| {
                job.config.source_ids.is_empty() || job.config.source_ids.contains(id)
            })
            .map(|(id, scraper)| (*id, scraper.source().priority))
            .collect();
        eligible.sort_by(|a, b| b.1.cmp(&a.1));
        eligible.into_iter().map(|(id, _)| id).collect()
    }

    /// Drives one product through every eligible scraper and persists the
    /// top matches. Returns whether the product produced saved results.
    async fn process_product(
        &self,
        registry: &mut HashMap<Uuid, Box<dyn SiteScraper>>,
        scraper_order: &[Uuid],
        job: &ScrapingJob,
        product: &NormalizedProduct,
    ) -> bool {
        let terms = build_search_terms(product);
        if terms.is_empty() {
            tracing::warn!(
                supplier_product_id = %product.supplier_product_id,
                "no usable search terms for product"
            );
            return false;
        }

        let mut candidates: Vec<PriceScrapingResult> = Vec::new();

        for source_id in scraper_order {
            let Some(scraper) = registry.get_mut(source_id) else {
                continue;
            };
            let source = scraper.source().clone();

            // First term that yields any result wins for this source.
            for term in &terms {
                match scraper.scrape_product(term).await {
                    Ok(Some(listing)) => {
                        if host_allowed(
                            &listing.url,
                            &source.config.allowed_domains,
                            &source.config.blocked_domains,
                        ) {
                            candidates.push(listing.into_result(
                                &product.supplier_product_id,
                                source.id,
                                job.id,
                            ));
                        } else {
                            tracing::debug!(
                                source = %source.name,
                                url = %listing.url,
                                "listing rejected by domain filter"
                            );
                        }
                        break;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(
                            source = %source.name,
                            term,
                            error = %e,
                            "scrape failed for term, moving on"
                        );
                        break;
                    }
                }
            }
        }

        if candidates.is_empty() {
            tracing::debug!(
                supplier_product_id = %product.supplier_product_id,
                "no candidates from any source"
            );
            return false;
        }

        let matched = self.matcher.find_matches(product, candidates);
        if matched.scraped_results.is_empty() {
            tracing::debug!(
                supplier_product_id = %product.supplier_product_id,
                "no candidate cleared the match threshold"
            );
            return false;
        }

        // Persistence policy: cheapest first, top three, cheapest flagged.
        let mut results: Vec<PriceScrapingResult> = matched
            .scraped_results
            .into_iter()
            .map(|scored| scored.result)
            .collect();
        results.sort_by(|a, b| a.price.cmp(&b.price));
        results.truncate(RESULTS_PER_PRODUCT);
        if let Some(cheapest) = results.first_mut() {
            cheapest.is_lowest_price = true;
        }

        match self
            .result_sink
            .save_results(&product.supplier_product_id, results)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    supplier_product_id = %product.supplier_product_id,
                    error = %e,
                    "failed to persist results"
                );
                false
            }
        }
    }

    /// Releases every registered scraper and empties the registry.
    async fn cleanup_scrapers(&self) {
        let mut registry = self.scrapers.lock().await;
        for (source_id, scraper) in registry.iter_mut() {
            tracing::debug!(source_id = %source_id, "cleaning up scraper");
            scraper.cleanup().await;
        }
        registry.clear();
    }

    /// Clears the running slot only when it still belongs to this job —
    /// `stop_job` may already have cleared it, and a subsequent job must
    /// not be wiped by a late-finishing predecessor.
    fn clear_running_if_current(&self, running: &Arc<RunningJob>) {
        let mut guard = self.running.lock().expect("running lock poisoned");
        if let Some(current) = guard.as_ref() {
            if Arc::ptr_eq(current, running) {
                *guard = None;
            }
        }
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
