//! Filter-metadata settings shared by the job and the endpoint.
//!
//! # Environment Variables
//!
//! - `PRICE_UNIT`: `minor` when the catalog stores cents, `major` when it
//!   stores currency units (default: `minor`)
//! - `FALLBACK_LIMIT`: maximum items read by a request-time fallback
//!   aggregation (default: `1000`)
//! - `FILTER_CACHE_MAX_AGE_SECONDS`: `Cache-Control: max-age` of the
//!   endpoint response (default: `60`)

use vitrine_models::PriceUnit;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PricingConfig {
    pub unit: PriceUnit,
}

impl PricingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(crate::env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            unit: crate::parse_or(&lookup, "PRICE_UNIT", PriceUnit::default()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterEndpointConfig {
    pub fallback_limit: u32,
    pub max_age_seconds: u64,
}

impl Default for FilterEndpointConfig {
    fn default() -> Self {
        Self {
            fallback_limit: 1000,
            max_age_seconds: 60,
        }
    }
}

impl FilterEndpointConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(crate::env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            fallback_limit: crate::parse_or(&lookup, "FALLBACK_LIMIT", defaults.fallback_limit)
                .max(1),
            max_age_seconds: crate::parse_or(
                &lookup,
                "FILTER_CACHE_MAX_AGE_SECONDS",
                defaults.max_age_seconds,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lookup;

    #[test]
    fn test_price_unit_defaults_to_minor() {
        assert_eq!(PricingConfig::from_lookup(lookup(&[])).unit, PriceUnit::Minor);
        assert_eq!(
            PricingConfig::from_lookup(lookup(&[("PRICE_UNIT", "major")])).unit,
            PriceUnit::Major
        );
        assert_eq!(
            PricingConfig::from_lookup(lookup(&[("PRICE_UNIT", "bananas")])).unit,
            PriceUnit::Minor
        );
    }

    #[test]
    fn test_endpoint_defaults() {
        let config = FilterEndpointConfig::from_lookup(lookup(&[("FALLBACK_LIMIT", "25")]));
        assert_eq!(config.fallback_limit, 25);
        assert_eq!(config.max_age_seconds, 60);
    }
}
