use axum::{Router, middleware, routing::get};
use vitrine_cache::{CacheControlConfig, cache_control, etag_middleware};
use vitrine_config::FilterEndpointConfig;

use crate::state::AppState;

use super::controller::get_filter_metadata;

/// Routes mounted under `/store/custom`.
pub fn init_filters_router(config: &FilterEndpointConfig) -> Router<AppState> {
    Router::new()
        .route("/products/filter-metadata", get(get_filter_metadata))
        .layer(middleware::from_fn(etag_middleware))
        .layer(cache_control(CacheControlConfig::public(config.max_age_seconds)))
}
