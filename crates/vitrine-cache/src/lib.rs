//! # Vitrine Cache
//!
//! Storage for aggregated filter summaries and HTTP caching for the
//! endpoints that serve them.
//!
//! This crate provides:
//! - The [`FilterStore`] trait, the seam between the service and storage
//! - [`RedisCache`], storing every context as a field of one Redis hash
//! - [`MemoryFilterStore`], an in-process store with the same TTL and lock semantics
//! - Cache configuration from environment variables
//! - HTTP caching middleware (ETag, Cache-Control)
//!
//! # Example
//!
//! ```ignore
//! use vitrine_cache::{CacheConfig, FilterStore, RedisCache};
//! use vitrine_models::ContextKey;
//!
//! let cache = RedisCache::new(&CacheConfig::from_env()).await?;
//! let [exact, global] = cache
//!     .get_summaries(&[context.clone(), ContextKey::global()])
//!     .await?
//!     .try_into()
//!     .unwrap();
//! ```

pub mod config;
pub mod keys;
pub mod memory;
pub mod middleware;
pub mod redis;
pub mod store;

pub use config::CacheConfig;
pub use keys::FilterKeys;
pub use memory::MemoryFilterStore;
pub use middleware::{CacheControlConfig, cache_control, etag_middleware};
pub use redis::RedisCache;
pub use store::{CacheError, FilterStore, LockToken};
