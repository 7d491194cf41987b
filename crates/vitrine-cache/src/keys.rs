//! Redis key layout.
//!
//! All summaries live in one hash so a single `EXPIRE` covers the whole
//! mapping, matching the lifetime of the snapshot the job writes.

/// Version suffix of the summary hash. Bump when the stored JSON changes shape.
const SNAPSHOT_KEY: &str = "product_filters_v1";

#[derive(Debug, Clone)]
pub struct FilterKeys {
    prefix: String,
}

impl FilterKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Hash holding one field per encoded context key.
    pub fn snapshot(&self) -> String {
        format!("{}:{}", self.prefix, SNAPSHOT_KEY)
    }

    /// String key of a named leader lock.
    pub fn lock(&self, name: &str) -> String {
        format!("{}:lock:{}", self.prefix, name)
    }
}
