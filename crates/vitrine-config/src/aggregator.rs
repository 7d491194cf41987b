//! Filter cache job configuration.
//!
//! # Environment Variables
//!
//! - `AGGREGATOR_ENABLED`: spawn the scheduled job with the server (default: `true`)
//! - `AGGREGATOR_INTERVAL_SECONDS`: seconds between runs (default: `900`, every 15 minutes)
//! - `AGGREGATOR_RUN_ON_STARTUP`: run immediately instead of after one interval (default: `true`)
//! - `AGGREGATOR_BATCH_SIZE`: catalog page size (default: `100`)
//! - `AGGREGATOR_BATCH_DELAY_MS`: pause between full pages (default: `10`)
//! - `AGGREGATOR_LOCK_TTL_SECONDS`: leader lock lifetime; must exceed the
//!   slowest expected run (default: `600`)

use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatorConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub run_on_startup: bool,
    pub batch_size: u32,
    pub batch_delay: Duration,
    pub lock_ttl: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(15 * 60),
            run_on_startup: true,
            batch_size: 100,
            batch_delay: Duration::from_millis(10),
            lock_ttl: Duration::from_secs(600),
        }
    }
}

impl AggregatorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(crate::env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            enabled: crate::flag_or(&lookup, "AGGREGATOR_ENABLED", defaults.enabled),
            interval: Duration::from_secs(
                crate::parse_or(
                    &lookup,
                    "AGGREGATOR_INTERVAL_SECONDS",
                    defaults.interval.as_secs(),
                )
                .max(1),
            ),
            run_on_startup: crate::flag_or(
                &lookup,
                "AGGREGATOR_RUN_ON_STARTUP",
                defaults.run_on_startup,
            ),
            batch_size: crate::parse_or(&lookup, "AGGREGATOR_BATCH_SIZE", defaults.batch_size)
                .max(1),
            batch_delay: Duration::from_millis(crate::parse_or(
                &lookup,
                "AGGREGATOR_BATCH_DELAY_MS",
                defaults.batch_delay.as_millis() as u64,
            )),
            lock_ttl: Duration::from_secs(
                crate::parse_or(
                    &lookup,
                    "AGGREGATOR_LOCK_TTL_SECONDS",
                    defaults.lock_ttl.as_secs(),
                )
                .max(1),
            ),
        }
    }
}
