//! # Vitrine Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`server`]: Listener address and CORS origins
//! - [`database`]: Catalog database connection settings
//! - [`aggregator`]: Schedule, batching and locking of the filter cache job
//! - [`classifier`]: The option-title token table used to classify facets
//! - [`filters`]: Pricing unit and request-time fallback settings
//!
//! Every struct exposes `from_env()` plus a `from_lookup()` constructor that
//! reads through a closure, so parsing can be exercised without touching the
//! process environment.
//!
//! # Example
//!
//! ```ignore
//! use vitrine_config::{AggregatorConfig, ClassifierConfig, ServerConfig};
//!
//! let server = ServerConfig::from_env();
//! let aggregator = AggregatorConfig::from_env();
//! let classifier = ClassifierConfig::from_env();
//! ```

pub mod aggregator;
pub mod classifier;
pub mod database;
pub mod filters;
pub mod server;

pub use aggregator::AggregatorConfig;
pub use classifier::ClassifierConfig;
pub use database::DatabaseConfig;
pub use filters::{FilterEndpointConfig, PricingConfig};
pub use server::ServerConfig;

use std::str::FromStr;

/// Parse `key` through `lookup`, falling back to `default` when the variable
/// is unset or does not parse.
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
                default
            }
        },
        None => default,
    }
}

/// Boolean flag: anything but `false`/`0` (case-insensitive) enables it.
pub(crate) fn flag_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            let v = v.trim().to_lowercase();
            v != "false" && v != "0"
        })
        .unwrap_or(default)
}

pub(crate) fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    pub fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }
}
