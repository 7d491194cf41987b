use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use vitrine_cache::{CacheConfig, FilterStore, MemoryFilterStore, RedisCache};
use vitrine_config::{
    AggregatorConfig, ClassifierConfig, DatabaseConfig, FilterEndpointConfig, PricingConfig,
    ServerConfig,
};
use vitrine_db::{CatalogSource, PgCatalog, init_db_pool};

use crate::aggregation::FacetClassifier;

#[derive(Clone, Debug)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogSource>,
    pub store: Arc<dyn FilterStore>,
    pub classifier: Arc<FacetClassifier>,
    pub pricing: PricingConfig,
    pub filters_config: FilterEndpointConfig,
    pub aggregator_config: AggregatorConfig,
    pub server_config: ServerConfig,
}

impl AppState {
    /// State over the given catalog and store with default configuration.
    pub fn new(catalog: Arc<dyn CatalogSource>, store: Arc<dyn FilterStore>) -> Self {
        Self {
            catalog,
            store,
            classifier: Arc::new(FacetClassifier::default()),
            pricing: PricingConfig::default(),
            filters_config: FilterEndpointConfig::default(),
            aggregator_config: AggregatorConfig::default(),
            server_config: ServerConfig::default(),
        }
    }
}

/// Connects to Redis, falling back to an in-process store when Redis is
/// unreachable and `CACHE_FALLBACK_IN_MEMORY` allows it.
pub async fn init_filter_store(config: &CacheConfig) -> anyhow::Result<Arc<dyn FilterStore>> {
    match RedisCache::new(config).await {
        Ok(cache) => {
            info!(prefix = %config.key_prefix, "Connected to Redis filter store");
            Ok(Arc::new(cache))
        }
        Err(e) if config.fallback_in_memory => {
            warn!(
                error = %e,
                "Redis unavailable, using in-memory filter store (not shared across instances)"
            );
            Ok(Arc::new(MemoryFilterStore::new(config.ttl)))
        }
        Err(e) => Err(e).context("Failed to connect to Redis filter store"),
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let pool = init_db_pool(&DatabaseConfig::from_env())
        .await
        .context("Failed to connect to catalog database")?;
    let store = init_filter_store(&CacheConfig::from_env()).await?;

    let pricing = PricingConfig::from_env();
    info!(price_unit = pricing.unit.as_str(), "Catalog price unit configured");

    Ok(AppState {
        catalog: Arc::new(PgCatalog::new(pool)),
        store,
        classifier: Arc::new(FacetClassifier::from_config(&ClassifierConfig::from_env())),
        pricing,
        filters_config: FilterEndpointConfig::from_env(),
        aggregator_config: AggregatorConfig::from_env(),
        server_config: ServerConfig::from_env(),
    })
}
