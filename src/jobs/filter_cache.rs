//! Scheduled rebuild of the filter summary cache.
//!
//! Each run pages through the whole published catalog, aggregates it by
//! item context and replaces the stored mapping in one atomic write. Runs
//! across instances are serialized by a leader lock in the filter store;
//! within one process the ticker skips missed ticks, so runs never overlap.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use vitrine_cache::{CacheError, FilterStore};
use vitrine_config::{AggregatorConfig, PricingConfig};
use vitrine_db::{CatalogError, CatalogQuery, CatalogSource};
use vitrine_models::CatalogItem;

use crate::aggregation::{FacetClassifier, aggregate_by_context};
use crate::metrics::{set_cached_contexts, track_job_run, track_unclassified_options};
use crate::state::AppState;

/// Name of the leader lock guarding the rebuild.
pub const FILTER_CACHE_LOCK: &str = "filter-cache";

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("catalog read failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("filter store failed: {0}")]
    Store(#[from] CacheError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub contexts: usize,
    pub products: u64,
    pub pages: u32,
    pub unclassified: BTreeSet<String>,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(JobReport),
    /// Another holder had the leader lock; nothing was read or written.
    Skipped,
}

#[derive(Clone, Debug)]
pub struct FilterCacheJob {
    catalog: Arc<dyn CatalogSource>,
    store: Arc<dyn FilterStore>,
    classifier: Arc<FacetClassifier>,
    pricing: PricingConfig,
    config: AggregatorConfig,
}

impl FilterCacheJob {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        store: Arc<dyn FilterStore>,
        classifier: Arc<FacetClassifier>,
        pricing: PricingConfig,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            classifier,
            pricing,
            config,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.catalog.clone(),
            state.store.clone(),
            state.classifier.clone(),
            state.pricing,
            state.aggregator_config.clone(),
        )
    }

    /// Runs one rebuild if the leader lock can be taken. The lock is
    /// released whether or not the rebuild succeeds; a failed rebuild
    /// leaves the stored mapping as it was.
    #[instrument(skip(self), fields(job = FILTER_CACHE_LOCK))]
    pub async fn run_once(&self) -> Result<JobOutcome, JobError> {
        let started = Instant::now();

        let token = match self
            .store
            .try_acquire_lock(FILTER_CACHE_LOCK, self.config.lock_ttl)
            .await
        {
            Ok(Some(token)) => token,
            Ok(None) => {
                info!("Filter cache lock held elsewhere, skipping run");
                track_job_run("skipped", started.elapsed());
                return Ok(JobOutcome::Skipped);
            }
            Err(e) => {
                error!(error = %e, "Could not take filter cache lock");
                track_job_run("failed", started.elapsed());
                return Err(e.into());
            }
        };

        let result = self.rebuild(started).await;

        match self.store.release_lock(&token).await {
            Ok(true) => debug!("Filter cache lock released"),
            Ok(false) => warn!("Filter cache lock expired before the run finished"),
            Err(e) => warn!(error = %e, "Failed to release filter cache lock"),
        }

        match &result {
            Ok(report) => {
                info!(
                    contexts = report.contexts,
                    products = report.products,
                    pages = report.pages,
                    duration_ms = report.duration.as_millis() as u64,
                    "Filter cache rebuilt"
                );
                track_job_run("completed", report.duration);
                set_cached_contexts(report.contexts);
            }
            Err(e) => {
                error!(error = %e, "Filter cache rebuild failed, keeping previous mapping");
                track_job_run("failed", started.elapsed());
            }
        }

        result.map(JobOutcome::Completed)
    }

    async fn rebuild(&self, started: Instant) -> Result<JobReport, JobError> {
        let (items, pages) = self.load_catalog().await?;

        let output = aggregate_by_context(&items, &self.classifier, self.pricing.unit);
        if !output.unclassified.is_empty() {
            warn!(
                titles = ?output.unclassified,
                "Option titles matched no facet and were ignored"
            );
            track_unclassified_options(output.unclassified.len());
        }

        self.store.replace_snapshot(&output.snapshot).await?;

        Ok(JobReport {
            contexts: output.snapshot.len(),
            products: output.snapshot.total_products(),
            pages,
            unclassified: output.unclassified,
            duration: started.elapsed(),
        })
    }

    /// Pages until a short page, pausing between full pages.
    async fn load_catalog(&self) -> Result<(Vec<CatalogItem>, u32), JobError> {
        let batch_size = self.config.batch_size.max(1);
        let mut items = Vec::new();
        let mut offset = 0u64;
        let mut pages = 0u32;

        loop {
            let page = self
                .catalog
                .list_published(&CatalogQuery::page(offset, batch_size))
                .await?;
            pages += 1;

            let fetched = page.len();
            debug!(offset, fetched, "Catalog page fetched");
            items.extend(page);

            if fetched < batch_size as usize {
                break;
            }

            offset += fetched as u64;
            if !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        Ok((items, pages))
    }

    /// Runs on a fixed interval until `cancel` fires. The first run starts
    /// immediately when `run_on_startup` is set. A run in progress is
    /// allowed to finish so the lock is always released.
    pub async fn run(self, cancel: CancellationToken) {
        let period = self.config.interval.max(Duration::from_secs(1));
        let first = if self.config.run_on_startup {
            Instant::now()
        } else {
            Instant::now() + period
        };

        let mut ticker = tokio::time::interval_at(first, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = period.as_secs(),
            run_on_startup = self.config.run_on_startup,
            "Filter cache job scheduled"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    // Failures are logged and counted inside run_once; the
                    // next tick is the retry.
                    let _ = self.run_once().await;
                }
            }
        }

        info!("Filter cache job stopped");
    }
}
