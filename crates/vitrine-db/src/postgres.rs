//! Catalog reads against the commerce platform's Postgres schema.
//!
//! Items are read in three round trips per page: the product rows, then the
//! options with their values, then the variants with their base price, the
//! last two keyed by `= ANY($1)` over the page's product ids.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::{debug, instrument};
use vitrine_models::{
    CatalogItem, CategoryId, CollectionId, ConfigurableOption, ProductId, ProductStatus,
    ProductTypeId, Variant, VariantId,
};

use crate::catalog::{CatalogError, CatalogQuery, CatalogSource};

const PRODUCTS_SQL: &str = r#"
SELECT
    p.id,
    p.type_id,
    p.collection_id,
    (SELECT MIN(pcp.product_category_id)
       FROM product_category_product pcp
      WHERE pcp.product_id = p.id) AS category_id
FROM product p
WHERE p.status = 'published'
  AND p.deleted_at IS NULL
  AND (cardinality($1::text[]) = 0 OR p.type_id = ANY($1))
  AND (cardinality($2::text[]) = 0 OR p.collection_id = ANY($2))
  AND (cardinality($3::text[]) = 0 OR EXISTS (
        SELECT 1
          FROM product_category_product pcp
         WHERE pcp.product_id = p.id
           AND pcp.product_category_id = ANY($3)))
ORDER BY p.id
LIMIT $4 OFFSET $5
"#;

const OPTIONS_SQL: &str = r#"
SELECT
    o.product_id,
    o.id AS option_id,
    o.title,
    v.value
FROM product_option o
LEFT JOIN product_option_value v
       ON v.option_id = o.id
      AND v.deleted_at IS NULL
WHERE o.product_id = ANY($1)
  AND o.deleted_at IS NULL
ORDER BY o.product_id, o.id, v.id
"#;

const VARIANTS_SQL: &str = r#"
SELECT
    pv.product_id,
    pv.id,
    (SELECT MIN(pr.amount)
       FROM product_variant_price_set pvps
       JOIN price pr
         ON pr.price_set_id = pvps.price_set_id
        AND pr.deleted_at IS NULL
      WHERE pvps.variant_id = pv.id
        AND pvps.deleted_at IS NULL)::float8 AS price
FROM product_variant pv
WHERE pv.product_id = ANY($1)
  AND pv.deleted_at IS NULL
ORDER BY pv.product_id, pv.id
"#;

#[derive(Debug, FromRow)]
struct ProductRow {
    id: ProductId,
    type_id: Option<ProductTypeId>,
    collection_id: Option<CollectionId>,
    category_id: Option<CategoryId>,
}

#[derive(Debug, FromRow)]
struct OptionRow {
    product_id: ProductId,
    option_id: String,
    title: String,
    value: Option<String>,
}

#[derive(Debug, FromRow)]
struct VariantRow {
    product_id: ProductId,
    id: VariantId,
    price: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn options_by_product(
        &self,
        product_ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Vec<ConfigurableOption>>, CatalogError> {
        let rows = sqlx::query_as::<_, OptionRow>(OPTIONS_SQL)
            .bind(product_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<ProductId, Vec<ConfigurableOption>> = HashMap::new();
        let mut current: Option<(ProductId, String)> = None;

        for row in rows {
            let options = grouped.entry(row.product_id.clone()).or_default();
            let same_option = current
                .as_ref()
                .is_some_and(|(p, o)| *p == row.product_id && *o == row.option_id);

            if !same_option {
                options.push(ConfigurableOption {
                    title: row.title,
                    values: Vec::new(),
                });
                current = Some((row.product_id, row.option_id));
            }

            if let (Some(value), Some(option)) = (row.value, options.last_mut()) {
                option.values.push(value);
            }
        }

        Ok(grouped)
    }

    async fn variants_by_product(
        &self,
        product_ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Vec<Variant>>, CatalogError> {
        let rows = sqlx::query_as::<_, VariantRow>(VARIANTS_SQL)
            .bind(product_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<ProductId, Vec<Variant>> = HashMap::new();
        for row in rows {
            grouped.entry(row.product_id).or_default().push(Variant {
                id: row.id,
                price: row.price,
                calculated_price: None,
            });
        }

        Ok(grouped)
    }
}

#[async_trait]
impl CatalogSource for PgCatalog {
    #[instrument(skip(self), fields(catalog.offset = query.offset, catalog.limit = query.limit))]
    async fn list_published(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>, CatalogError> {
        let products = sqlx::query_as::<_, ProductRow>(PRODUCTS_SQL)
            .bind(query.type_ids.as_slice())
            .bind(query.collection_ids.as_slice())
            .bind(query.category_ids.as_slice())
            .bind(i64::from(query.limit))
            .bind(i64::try_from(query.offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        if products.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<ProductId> = products.iter().map(|p| p.id.clone()).collect();
        let mut options = self.options_by_product(&product_ids).await?;
        let mut variants = self.variants_by_product(&product_ids).await?;

        let items: Vec<CatalogItem> = products
            .into_iter()
            .map(|row| CatalogItem {
                options: options.remove(&row.id).unwrap_or_default(),
                variants: variants.remove(&row.id).unwrap_or_default(),
                status: ProductStatus::Published,
                type_id: row.type_id,
                collection_id: row.collection_id,
                category_id: row.category_id,
                id: row.id,
            })
            .collect();

        debug!(catalog.items = items.len(), "Catalog page loaded");

        Ok(items)
    }

    async fn ping(&self) -> Result<(), CatalogError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
