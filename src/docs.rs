use utoipa::OpenApi;
use vitrine_models::{FilterSummary, PriceRange};

use crate::modules::health::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::filters::controller::get_filter_metadata,
        crate::modules::health::controller::health_check,
    ),
    components(
        schemas(
            FilterSummary,
            PriceRange,
            HealthResponse,
        )
    ),
    tags(
        (name = "Filters", description = "Storefront filter facets per listing context"),
        (name = "Health", description = "Service and dependency status")
    ),
    info(
        title = "Vitrine",
        version = "0.1.0",
        description = "Cached product filter metadata (colors, styles, sizes, price range) for storefront listings.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;
