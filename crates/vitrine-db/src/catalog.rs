use async_trait::async_trait;
use vitrine_models::{CatalogItem, CategoryId, CollectionId, ContextKey, ProductTypeId};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    #[error("DATABASE_URL must be set")]
    NotConfigured,
}

/// Filters for listing published catalog items.
///
/// An empty id list places no constraint on that dimension; a non-empty
/// list matches items associated with any of its ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub type_ids: Vec<ProductTypeId>,
    pub collection_ids: Vec<CollectionId>,
    pub category_ids: Vec<CategoryId>,
    pub offset: u64,
    pub limit: u32,
}

impl CatalogQuery {
    /// An unfiltered page over all published items.
    pub fn page(offset: u64, limit: u32) -> Self {
        Self {
            offset,
            limit,
            ..Default::default()
        }
    }

    /// The first `limit` published items matching a context's filters.
    pub fn for_context(context: &ContextKey, limit: u32) -> Self {
        Self {
            type_ids: context.type_ids().iter().cloned().collect(),
            collection_ids: context.collection_ids().iter().cloned().collect(),
            category_ids: context.category_ids().iter().cloned().collect(),
            offset: 0,
            limit,
        }
    }
}

/// Read capability over the commerce platform's published catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync + std::fmt::Debug {
    /// List published items with options, option values and variants
    /// expanded, ordered by product id.
    async fn list_published(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Cheap connectivity probe used by the health endpoint.
    async fn ping(&self) -> Result<(), CatalogError>;
}
