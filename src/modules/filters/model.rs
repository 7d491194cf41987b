use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;
use vitrine_core::serde::{deserialize_id_list, deserialize_optional_string};
use vitrine_models::{CategoryId, CollectionId, ContextKey, ProductTypeId};

/// Upper bound on ids per dimension in one request, enforced by the
/// `length` validators below.
pub const MAX_IDS_PER_FILTER: usize = 100;

/// Storefront listing filters. Each id parameter may be repeated
/// (`?type_id=a&type_id=b`); empty values are ignored.
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterMetadataQuery {
    /// Product type ids
    #[serde(default, deserialize_with = "deserialize_id_list")]
    #[param(value_type = Option<Vec<String>>)]
    #[validate(length(max = 100, message = "At most 100 type ids are allowed"))]
    pub type_id: Vec<ProductTypeId>,

    /// Collection ids
    #[serde(default, deserialize_with = "deserialize_id_list")]
    #[param(value_type = Option<Vec<String>>)]
    #[validate(length(max = 100, message = "At most 100 collection ids are allowed"))]
    pub collection_id: Vec<CollectionId>,

    /// Category ids
    #[serde(default, deserialize_with = "deserialize_id_list")]
    #[param(value_type = Option<Vec<String>>)]
    #[validate(length(max = 100, message = "At most 100 category ids are allowed"))]
    pub category_id: Vec<CategoryId>,

    /// Region of the storefront session. Accepted for compatibility;
    /// summaries are not region specific.
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub region_id: Option<String>,
}

impl FilterMetadataQuery {
    pub fn context_key(&self) -> ContextKey {
        ContextKey::from_filters(
            self.type_id.iter().cloned(),
            self.collection_id.iter().cloned(),
            self.category_id.iter().cloned(),
        )
    }
}
