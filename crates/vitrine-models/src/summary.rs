//! Aggregated filter metadata.
//!
//! A [`FilterSummary`] is the response body of the filter-metadata endpoint
//! and the value stored per context in the cache. A [`FilterSnapshot`] is
//! the full mapping from [`ContextKey`] to summary produced by one
//! aggregation run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::context::ContextKey;

/// Unit the catalog stores variant amounts in.
///
/// `Minor` amounts (cents) are divided by 100 before the price range is
/// rounded; `Major` amounts are used as-is. One unit applies to every
/// aggregation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceUnit {
    #[default]
    Minor,
    Major,
}

impl PriceUnit {
    pub fn divisor(&self) -> f64 {
        match self {
            Self::Minor => 100.0,
            Self::Major => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

impl fmt::Display for PriceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minor" | "cents" => Ok(Self::Minor),
            "major" | "units" => Ok(Self::Major),
            other => Err(format!("unknown price unit: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

impl PriceRange {
    /// Range reported when no usable price was collected.
    pub const DEFAULT: PriceRange = PriceRange { min: 0, max: 1000 };

    /// Floor of the smallest and ceiling of the largest price, converted
    /// from `unit` into currency units. An empty list yields [`Self::DEFAULT`].
    pub fn from_prices(prices: &[f64], unit: PriceUnit) -> Self {
        if prices.is_empty() {
            return Self::DEFAULT;
        }

        let (min, max) = prices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &p| {
                (lo.min(p), hi.max(p))
            });

        let divisor = unit.divisor();
        Self {
            min: (min / divisor).floor() as i64,
            max: (max / divisor).ceil() as i64,
        }
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterSummary {
    pub price_range: PriceRange,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub colors: BTreeSet<String>,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub styles: BTreeSet<String>,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub sizes: BTreeSet<String>,
    #[serde(default)]
    pub product_count: u64,
}

impl FilterSummary {
    /// The safe default served whenever nothing better is available.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Context key → summary mapping produced by one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSnapshot(BTreeMap<ContextKey, FilterSummary>);

impl FilterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ContextKey) -> Option<&FilterSummary> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: ContextKey, summary: FilterSummary) -> Option<FilterSummary> {
        self.0.insert(key, summary)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContextKey, &FilterSummary)> {
        self.0.iter()
    }

    pub fn total_products(&self) -> u64 {
        self.0.values().map(|s| s.product_count).sum()
    }

    pub fn into_inner(self) -> BTreeMap<ContextKey, FilterSummary> {
        self.0
    }
}

impl FromIterator<(ContextKey, FilterSummary)> for FilterSnapshot {
    fn from_iter<I: IntoIterator<Item = (ContextKey, FilterSummary)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
