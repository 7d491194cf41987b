//! Filter cache configuration.

use std::env;
use std::time::Duration;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Filter cache configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `CACHE_REDIS_URL` or `REDIS_URL`: Redis connection URL, the former taking
///   precedence (default: `redis://127.0.0.1:6379`)
/// - `CACHE_TTL_SECONDS`: lifetime of the summary hash after each write (default: `3600`)
/// - `CACHE_PREFIX`: prefix for all keys (default: `vitrine`)
/// - `CACHE_MAX_RETRIES`: connection-level retries (default: `3`)
/// - `CACHE_FALLBACK_IN_MEMORY`: use an in-process store when Redis is
///   unreachable at startup (default: `true`)
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub redis_url: String,
    pub ttl: Duration,
    pub key_prefix: String,
    pub max_retries: usize,
    pub fallback_in_memory: bool,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            redis_url: non_empty("CACHE_REDIS_URL")
                .or_else(|| non_empty("REDIS_URL"))
                .unwrap_or(defaults.redis_url),
            ttl: non_empty("CACHE_TTL_SECONDS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.ttl),
            key_prefix: non_empty("CACHE_PREFIX").unwrap_or(defaults.key_prefix),
            max_retries: non_empty("CACHE_MAX_RETRIES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_retries),
            fallback_in_memory: non_empty("CACHE_FALLBACK_IN_MEMORY")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(defaults.fallback_in_memory),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.into(),
            ttl: Duration::from_secs(3600),
            key_prefix: "vitrine".into(),
            max_retries: 3,
            fallback_in_memory: true,
        }
    }
}
