//! # Vitrine Models
//!
//! Domain models shared by the filter aggregation job, the filter-metadata
//! endpoint and the cache layer.
//!
//! # Modules
//!
//! - [`ids`]: String id newtypes for catalog entities
//! - [`catalog`]: Catalog items, configurable options and variants as read from the commerce platform
//! - [`context`]: The [`ContextKey`] that partitions cached summaries
//! - [`facet`]: Option facets (color, style, size)
//! - [`summary`]: Aggregated [`FilterSummary`] values and the [`FilterSnapshot`] mapping
//!
//! # Example
//!
//! ```ignore
//! use vitrine_models::{ContextKey, FilterSnapshot, FilterSummary};
//!
//! let key = ContextKey::global();
//! let mut snapshot = FilterSnapshot::default();
//! snapshot.insert(key.clone(), FilterSummary::empty());
//! assert!(snapshot.get(&key).is_some());
//! ```

pub mod catalog;
pub mod context;
pub mod facet;
pub mod ids;
pub mod summary;

pub use catalog::{CatalogItem, ConfigurableOption, ProductStatus, Variant};
pub use context::{ContextKey, ContextKeyError, GLOBAL_CONTEXT};
pub use facet::Facet;
pub use ids::{CategoryId, CollectionId, ProductId, ProductTypeId, VariantId};
pub use summary::{FilterSnapshot, FilterSummary, PriceRange, PriceUnit};
