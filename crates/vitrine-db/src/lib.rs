//! # Vitrine DB
//!
//! Read access to the commerce platform's catalog.
//!
//! - [`catalog`]: the [`CatalogSource`] trait and [`CatalogQuery`]
//! - [`postgres`]: [`PgCatalog`], reading the platform's product tables
//! - [`memory`]: [`InMemoryCatalog`], a fixed item list with the same filter semantics
//!
//! # Example
//!
//! ```ignore
//! use vitrine_config::DatabaseConfig;
//! use vitrine_db::{CatalogQuery, CatalogSource, PgCatalog, init_db_pool};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! let catalog = PgCatalog::new(pool);
//! let first_page = catalog.list_published(&CatalogQuery::page(0, 100)).await?;
//! ```

pub mod catalog;
pub mod memory;
pub mod postgres;

pub use catalog::{CatalogError, CatalogQuery, CatalogSource};
pub use memory::InMemoryCatalog;
pub use postgres::PgCatalog;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

use sqlx::postgres::PgPoolOptions;
use vitrine_config::DatabaseConfig;

/// Initializes a PostgreSQL connection pool for the catalog database.
///
/// # Errors
///
/// Returns [`CatalogError::NotConfigured`] when `DATABASE_URL` is unset and
/// [`CatalogError::Database`] when the first connection cannot be made.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, CatalogError> {
    let url = config.url.as_deref().ok_or(CatalogError::NotConfigured)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(url)
        .await?;

    Ok(pool)
}
