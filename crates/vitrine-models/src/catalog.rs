//! Catalog items as read from the commerce platform.
//!
//! These types are read-only to Vitrine. They mirror the subset of a
//! product the filter aggregation needs: its dimension associations, its
//! configurable options and its variants' prices.

use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, CollectionId, ProductId, ProductTypeId, VariantId};

/// Publication status of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Proposed,
    Published,
    Rejected,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Proposed => "proposed",
            Self::Published => "published",
            Self::Rejected => "rejected",
        }
    }
}

/// A product with the associations and expansions used for faceting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ProductId,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub type_id: Option<ProductTypeId>,
    #[serde(default)]
    pub collection_id: Option<CollectionId>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub options: Vec<ConfigurableOption>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl CatalogItem {
    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Published
    }
}

/// A named axis of variation ("Cor", "Tamanho") and its permissible values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigurableOption {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl ConfigurableOption {
    pub fn new(title: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            title: title.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A purchasable variant. `calculated_price` is the contextual (region or
/// price-list) amount and wins over `price` when it is usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub calculated_price: Option<f64>,
}

impl Variant {
    pub fn priced(id: impl Into<VariantId>, price: f64) -> Self {
        Self {
            id: id.into(),
            price: Some(price),
            calculated_price: None,
        }
    }
}
