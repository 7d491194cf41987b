use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use vitrine_models::CatalogItem;

use crate::catalog::{CatalogError, CatalogQuery, CatalogSource};

/// A fixed catalog held in memory.
///
/// Applies the same published-only filtering, ordering and paging as
/// [`PgCatalog`](crate::PgCatalog). Category filters match only the item's
/// single `category_id`, whereas Postgres matches any category the product
/// belongs to. Counts `list_published` calls so callers can tell whether
/// the catalog was consulted at all.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: Vec<CatalogItem>,
    calls: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new(mut items: Vec<CatalogItem>) -> Self {
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            items,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `list_published` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn matches(item: &CatalogItem, query: &CatalogQuery) -> bool {
        fn dimension<T: PartialEq>(wanted: &[T], actual: Option<&T>) -> bool {
            wanted.is_empty() || actual.is_some_and(|id| wanted.contains(id))
        }

        item.is_published()
            && dimension(&query.type_ids, item.type_id.as_ref())
            && dimension(&query.collection_ids, item.collection_id.as_ref())
            && dimension(&query.category_ids, item.category_id.as_ref())
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalog {
    async fn list_published(&self, query: &CatalogQuery) -> Result<Vec<CatalogItem>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        Ok(self
            .items
            .iter()
            .filter(|item| Self::matches(item, query))
            .skip(offset)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), CatalogError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_models::{CategoryId, ProductId, ProductStatus, ProductTypeId};

    fn item(id: &str, status: ProductStatus, type_id: Option<&str>) -> CatalogItem {
        CatalogItem {
            id: ProductId::from(id),
            status,
            type_id: type_id.map(ProductTypeId::from),
            collection_id: None,
            category_id: None,
            options: Vec::new(),
            variants: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_only_published_items_are_listed() {
        let catalog = InMemoryCatalog::new(vec![
            item("prod_2", ProductStatus::Draft, None),
            item("prod_1", ProductStatus::Published, None),
        ]);

        let items = catalog.list_published(&CatalogQuery::page(0, 10)).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "prod_1");
        assert_eq!(catalog.calls(), 1);
    }

    #[tokio::test]
    async fn test_paging_is_ordered_by_id() {
        let catalog = InMemoryCatalog::new(
            (0..5)
                .rev()
                .map(|i| item(&format!("prod_{i}"), ProductStatus::Published, None))
                .collect(),
        );

        let page = catalog.list_published(&CatalogQuery::page(2, 2)).await.unwrap();
        let ids: Vec<&str> = page.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["prod_2", "prod_3"]);
    }

    #[tokio::test]
    async fn test_type_filter_matches_any_listed_id() {
        let catalog = InMemoryCatalog::new(vec![
            item("prod_1", ProductStatus::Published, Some("ptyp_a")),
            item("prod_2", ProductStatus::Published, Some("ptyp_b")),
            item("prod_3", ProductStatus::Published, None),
        ]);

        let query = CatalogQuery {
            type_ids: vec![ProductTypeId::from("ptyp_a"), ProductTypeId::from("ptyp_b")],
            ..CatalogQuery::page(0, 10)
        };
        let items = catalog.list_published(&query).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_category_filter_matches_item_category() {
        let catalog = InMemoryCatalog::new(vec![
            CatalogItem {
                category_id: Some(CategoryId::from("pcat_men")),
                ..item("prod_1", ProductStatus::Published, None)
            },
            CatalogItem {
                category_id: Some(CategoryId::from("pcat_women")),
                ..item("prod_2", ProductStatus::Published, None)
            },
        ]);

        let query = CatalogQuery {
            category_ids: vec![CategoryId::from("pcat_men")],
            ..CatalogQuery::page(0, 10)
        };
        let items = catalog.list_published(&query).await.unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["prod_1"]);
    }

    #[test]
    fn test_fixture_json_loads() {
        let items: Vec<CatalogItem> = serde_json::from_str(
            r#"[{"id":"prod_1","status":"published","options":[{"title":"Cor","values":["Azul"]}],
                "variants":[{"id":"variant_1","price":1990}]}]"#,
        )
        .unwrap();
        assert_eq!(items[0].options[0].values, vec!["Azul"]);
        assert_eq!(items[0].variants[0].price, Some(1990.0));
    }
}
