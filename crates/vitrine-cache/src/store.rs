use async_trait::async_trait;
use std::time::Duration;
use vitrine_models::{ContextKey, FilterSnapshot, FilterSummary};

/// Error type for filter store operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Filter store unavailable: {0}")]
    Unavailable(String),
}

/// Proof of holding a named leader lock. Only the holder's `value` can
/// release it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken {
    pub key: String,
    pub value: String,
}

/// Storage for the context → summary mapping.
///
/// Writes of a single context never read the rest of the mapping, so
/// concurrent fallbacks for different contexts cannot drop each other's
/// entries. Every write refreshes the TTL of the whole mapping.
#[async_trait]
pub trait FilterStore: Send + Sync + std::fmt::Debug {
    /// Look up several contexts in one round trip. The result has one
    /// slot per requested key, in order.
    async fn get_summaries(
        &self,
        keys: &[ContextKey],
    ) -> Result<Vec<Option<FilterSummary>>, CacheError>;

    /// Set one context, leaving all others untouched.
    async fn put_summary(&self, key: &ContextKey, summary: &FilterSummary)
    -> Result<(), CacheError>;

    /// Atomically replace the whole mapping.
    async fn replace_snapshot(&self, snapshot: &FilterSnapshot) -> Result<(), CacheError>;

    async fn load_snapshot(&self) -> Result<FilterSnapshot, CacheError>;

    /// Remaining lifetime of the mapping, `None` when absent.
    async fn ttl(&self) -> Result<Option<Duration>, CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;

    /// Take the named lock for at most `ttl`. `None` means another holder
    /// has it.
    async fn try_acquire_lock(
        &self,
        name: &str,
        ttl: Duration,
    ) -> Result<Option<LockToken>, CacheError>;

    /// Release a lock if it is still held by `token`. Returns whether
    /// anything was released.
    async fn release_lock(&self, token: &LockToken) -> Result<bool, CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
