use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// `ok` or `degraded`
    pub cache: String,
    /// Store implementation in use: `redis` or `memory`
    pub cache_backend: String,
    /// `ok` or `degraded`
    pub catalog: String,
    pub version: String,
}

fn component_status(healthy: bool) -> &'static str {
    if healthy { "ok" } else { "degraded" }
}

/// Always 200: the filter endpoint keeps serving (possibly empty)
/// summaries while a dependency is down.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and dependency status", body = HealthResponse)
    ),
    tag = "Health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (cache, catalog) = tokio::join!(state.store.ping(), state.catalog.ping());

    if let Err(e) = &cache {
        warn!(error = %e, "Filter store health check failed");
    }
    if let Err(e) = &catalog {
        warn!(error = %e, "Catalog health check failed");
    }

    Json(HealthResponse {
        status: "ok".to_string(),
        cache: component_status(cache.is_ok()).to_string(),
        cache_backend: state.store.backend().to_string(),
        catalog: component_status(catalog.is_ok()).to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
