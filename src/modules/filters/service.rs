use tracing::{debug, instrument, warn};
use vitrine_core::AppError;
use vitrine_db::CatalogQuery;
use vitrine_models::{ContextKey, FilterSummary};

use crate::aggregation::SummaryBuilder;
use crate::metrics::{track_cache_lookup, track_fallback_aggregation, track_unclassified_options};
use crate::state::AppState;

/// Where a served summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// Stored entry for the request's own context.
    Exact,
    /// Stored catalog-wide entry, served when the context has none.
    Global,
    /// Aggregated from the catalog for this request and stored.
    Fallback,
}

impl CacheSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Global => "global",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub summary: FilterSummary,
    pub source: CacheSource,
}

pub struct FilterMetadataService;

impl FilterMetadataService {
    /// Cache-aside lookup for one context.
    ///
    /// Store failures count as a miss. Only a failed catalog read during
    /// the fallback is an error.
    #[instrument(skip(state, context), fields(context = %context))]
    pub async fn resolve(state: &AppState, context: &ContextKey) -> Result<Resolution, AppError> {
        match state
            .store
            .get_summaries(&[context.clone(), ContextKey::global()])
            .await
        {
            Ok(found) => {
                let mut found = found.into_iter();
                let exact = found.next().flatten();
                let global = found.next().flatten();

                if let Some(summary) = exact {
                    debug!("Exact context hit");
                    return Ok(Self::served(summary, CacheSource::Exact));
                }
                if let Some(summary) = global {
                    debug!("Serving global summary for uncached context");
                    return Ok(Self::served(summary, CacheSource::Global));
                }
            }
            Err(e) => {
                warn!(error = %e, backend = state.store.backend(), "Filter store read failed, treating as miss");
            }
        }

        let summary = Self::aggregate_fallback(state, context).await?;

        if let Err(e) = state.store.put_summary(context, &summary).await {
            warn!(error = %e, "Failed to store fallback summary");
        }

        Ok(Self::served(summary, CacheSource::Fallback))
    }

    /// Aggregates up to `fallback_limit` matching items into one summary.
    #[instrument(skip(state, context), fields(context = %context))]
    pub async fn aggregate_fallback(
        state: &AppState,
        context: &ContextKey,
    ) -> Result<FilterSummary, AppError> {
        let query = CatalogQuery::for_context(context, state.filters_config.fallback_limit);

        let items = state.catalog.list_published(&query).await.map_err(|e| {
            track_fallback_aggregation(false);
            AppError::service_unavailable(e)
        })?;

        let mut builder = SummaryBuilder::new(&state.classifier);
        for item in &items {
            builder.add_item(item);
        }

        if !builder.unclassified().is_empty() {
            debug!(titles = ?builder.unclassified(), "Option titles matched no facet and were ignored");
            track_unclassified_options(builder.unclassified().len());
        }
        track_fallback_aggregation(true);

        debug!(products = items.len(), "Fallback aggregation complete");

        Ok(builder.finish(state.pricing.unit))
    }

    fn served(summary: FilterSummary, source: CacheSource) -> Resolution {
        track_cache_lookup(source.as_str());
        Resolution { summary, source }
    }
}
