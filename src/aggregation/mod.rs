//! Facet aggregation.
//!
//! One implementation serves both the scheduled job (whole catalog,
//! grouped by each item's own context) and the request fallback (one
//! filtered page folded into a single summary), so both paths classify
//! options and convert prices identically.

pub mod classifier;
pub mod summary;

pub use classifier::FacetClassifier;
pub use summary::{AggregationOutput, SummaryBuilder, aggregate_by_context, effective_price};
