use axum::{
    Json,
    extract::State,
    http::header::CACHE_CONTROL,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Query, QueryRejection};
use tracing::{Span, field, instrument, warn};
use validator::Validate;
use vitrine_core::AppError;
use vitrine_models::FilterSummary;

use crate::metrics::track_cache_lookup;
use crate::modules::filters::model::FilterMetadataQuery;
use crate::modules::filters::service::FilterMetadataService;
use crate::state::AppState;

/// Response header naming where the summary came from:
/// `exact`, `global`, `fallback` or `error`.
pub const FILTER_CACHE_HEADER: &str = "x-filter-cache";

#[utoipa::path(
    get,
    path = "/store/custom/products/filter-metadata",
    params(FilterMetadataQuery),
    responses(
        (status = 200, description = "Facets and price range for the filtered listing. Internal failures degrade to an empty summary", body = FilterSummary,
            headers(
                ("x-filter-cache" = String, description = "exact | global | fallback | error"),
                ("etag" = String, description = "Strong validator of the body")
            )
        ),
        (status = 304, description = "Not modified since the supplied ETag")
    ),
    tag = "Filters"
)]
#[instrument(
    skip(state, query),
    fields(region_id = field::Empty, context = field::Empty, cache = field::Empty)
)]
pub async fn get_filter_metadata(
    State(state): State<AppState>,
    query: Result<Query<FilterMetadataQuery>, QueryRejection>,
) -> Response {
    let span = Span::current();

    let resolved = match query {
        Ok(Query(query)) => {
            if let Some(region_id) = &query.region_id {
                span.record("region_id", region_id.as_str());
            }
            match query.validate() {
                Ok(()) => {
                    let context = query.context_key();
                    span.record("context", field::display(&context));
                    FilterMetadataService::resolve(&state, &context).await
                }
                Err(errors) => Err(AppError::bad_request(errors)),
            }
        }
        Err(rejection) => Err(AppError::bad_request(anyhow::anyhow!("{rejection}"))),
    };

    match resolved {
        Ok(resolution) => {
            let source = resolution.source.as_str();
            span.record("cache", source);
            ([(FILTER_CACHE_HEADER, source)], Json(resolution.summary)).into_response()
        }
        Err(e) => {
            warn!(error = %e, status = %e.status, "Serving empty filter summary");
            span.record("cache", "error");
            track_cache_lookup("error");
            (
                [(FILTER_CACHE_HEADER, "error"), (CACHE_CONTROL.as_str(), "no-store")],
                Json(FilterSummary::empty()),
            )
                .into_response()
        }
    }
}
