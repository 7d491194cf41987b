//! Context keys partition cached filter summaries by the combination of
//! type, collection and category ids a storefront listing is filtered on.
//!
//! A key is a structured value, not a joined string: each dimension is a
//! sorted set, so two requests naming the same ids in a different order or
//! with duplicates resolve to the same key. The wire encoding is either the
//! literal `"global"` (no dimension filters) or the compact JSON object
//!
//! ```text
//! {"category":["pcat_1"],"collection":[],"type":["ptyp_a","ptyp_b"]}
//! ```
//!
//! JSON string escaping keeps the encoding injective even when ids contain
//! `,`, `|` or `:`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::catalog::CatalogItem;
use crate::ids::{CategoryId, CollectionId, ProductTypeId};

/// Encoded form of the key with no dimension filters.
pub const GLOBAL_CONTEXT: &str = "global";

#[derive(Debug, thiserror::Error)]
pub enum ContextKeyError {
    #[error("malformed context key: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextKey {
    type_ids: BTreeSet<ProductTypeId>,
    collection_ids: BTreeSet<CollectionId>,
    category_ids: BTreeSet<CategoryId>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EncodedContextKey {
    #[serde(default, rename = "type")]
    type_ids: BTreeSet<ProductTypeId>,
    #[serde(default, rename = "collection")]
    collection_ids: BTreeSet<CollectionId>,
    #[serde(default, rename = "category")]
    category_ids: BTreeSet<CategoryId>,
}

impl ContextKey {
    /// The key used when no dimension filters apply.
    pub fn global() -> Self {
        Self::default()
    }

    /// Request-basis key: the union of the filter values supplied in a query.
    pub fn from_filters<T, C, G>(type_ids: T, collection_ids: C, category_ids: G) -> Self
    where
        T: IntoIterator<Item = ProductTypeId>,
        C: IntoIterator<Item = CollectionId>,
        G: IntoIterator<Item = CategoryId>,
    {
        Self {
            type_ids: type_ids.into_iter().collect(),
            collection_ids: collection_ids.into_iter().collect(),
            category_ids: category_ids.into_iter().collect(),
        }
    }

    /// Item-basis key: at most one id per dimension, taken from the item's
    /// own associations. An item of type `t` lands on the same key as a
    /// request filtered on exactly `type_id=t`.
    pub fn for_item(item: &CatalogItem) -> Self {
        Self::from_filters(
            item.type_id.iter().cloned(),
            item.collection_id.iter().cloned(),
            item.category_id.iter().cloned(),
        )
    }

    pub fn is_global(&self) -> bool {
        self.type_ids.is_empty() && self.collection_ids.is_empty() && self.category_ids.is_empty()
    }

    pub fn type_ids(&self) -> &BTreeSet<ProductTypeId> {
        &self.type_ids
    }

    pub fn collection_ids(&self) -> &BTreeSet<CollectionId> {
        &self.collection_ids
    }

    pub fn category_ids(&self) -> &BTreeSet<CategoryId> {
        &self.category_ids
    }

    /// Canonical string form, used as the cache field name.
    pub fn encode(&self) -> String {
        if self.is_global() {
            return GLOBAL_CONTEXT.to_string();
        }

        json!({
            "type": self.type_ids,
            "collection": self.collection_ids,
            "category": self.category_ids,
        })
        .to_string()
    }

    pub fn decode(encoded: &str) -> Result<Self, ContextKeyError> {
        if encoded == GLOBAL_CONTEXT {
            return Ok(Self::global());
        }

        let parsed: EncodedContextKey = serde_json::from_str(encoded)?;
        Ok(Self {
            type_ids: parsed.type_ids,
            collection_ids: parsed.collection_ids,
            category_ids: parsed.category_ids,
        })
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for ContextKey {
    type Err = ContextKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for ContextKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for ContextKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        Self::decode(&encoded).map_err(serde::de::Error::custom)
    }
}
