//! Strongly-typed ID newtypes for catalog entities.
//!
//! The commerce platform hands out opaque string identifiers
//! (`prod_01H...`, `ptyp_01H...`). Wrapping them keeps a collection id from
//! being passed where a product type id is expected, and gives every id
//! the ordering the [`ContextKey`](crate::ContextKey) sets rely on.
//!
//! # Example
//!
//! ```ignore
//! use vitrine_models::ids::{CollectionId, ProductTypeId};
//!
//! let type_id = ProductTypeId::from("ptyp_shirts");
//! let collection_id: CollectionId = "pcol_summer".into();
//! assert_eq!(type_id.as_str(), "ptyp_shirts");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Macro to define a string-backed ID newtype.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        #[schema(value_type = String)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Unwrap the raw identifier.
            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a catalog item (product).
    ProductId
);

define_id!(
    /// Identifier of a product type.
    ProductTypeId
);

define_id!(
    /// Identifier of a product collection.
    CollectionId
);

define_id!(
    /// Identifier of a product category.
    CategoryId
);

define_id!(
    /// Identifier of a product variant.
    VariantId
);
