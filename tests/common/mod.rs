#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use vitrine::router::init_router;
use vitrine::state::AppState;
use vitrine::vitrine_cache::{CacheError, FilterStore, LockToken, MemoryFilterStore};
use vitrine::vitrine_db::{CatalogError, CatalogQuery, CatalogSource, InMemoryCatalog};
use vitrine::vitrine_models::{
    CatalogItem, CategoryId, CollectionId, ConfigurableOption, ContextKey, FilterSnapshot,
    FilterSummary, ProductId, ProductStatus, ProductTypeId, Variant,
};

pub const FILTER_METADATA: &str = "/store/custom/products/filter-metadata";

/// A catalog whose every call fails, like an unreachable database.
#[derive(Debug)]
pub struct FailingCatalog;

#[async_trait]
impl CatalogSource for FailingCatalog {
    async fn list_published(&self, _: &CatalogQuery) -> Result<Vec<CatalogItem>, CatalogError> {
        Err(CatalogError::Unavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), CatalogError> {
        Err(CatalogError::Unavailable("connection refused".into()))
    }
}

/// A filter store whose every call fails, like an unreachable Redis.
#[derive(Debug)]
pub struct FailingStore;

fn down() -> CacheError {
    CacheError::Unavailable("connection reset".into())
}

#[async_trait]
impl FilterStore for FailingStore {
    async fn get_summaries(&self, _: &[ContextKey]) -> Result<Vec<Option<FilterSummary>>, CacheError> {
        Err(down())
    }

    async fn put_summary(&self, _: &ContextKey, _: &FilterSummary) -> Result<(), CacheError> {
        Err(down())
    }

    async fn replace_snapshot(&self, _: &FilterSnapshot) -> Result<(), CacheError> {
        Err(down())
    }

    async fn load_snapshot(&self) -> Result<FilterSnapshot, CacheError> {
        Err(down())
    }

    async fn ttl(&self) -> Result<Option<Duration>, CacheError> {
        Err(down())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Err(down())
    }

    async fn try_acquire_lock(&self, _: &str, _: Duration) -> Result<Option<LockToken>, CacheError> {
        Err(down())
    }

    async fn release_lock(&self, _: &LockToken) -> Result<bool, CacheError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(down())
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

pub fn memory_store() -> Arc<MemoryFilterStore> {
    Arc::new(MemoryFilterStore::new(Duration::from_secs(3600)))
}

pub fn product(id: &str) -> CatalogItem {
    CatalogItem {
        id: ProductId::from(id),
        status: ProductStatus::Published,
        type_id: None,
        collection_id: None,
        category_id: None,
        options: Vec::new(),
        variants: Vec::new(),
    }
}

/// Published shirts and shoes across two types, two collections and one
/// category, plus a draft that must never be counted.
pub fn sample_catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem {
            type_id: Some(ProductTypeId::from("ptyp_shirt")),
            collection_id: Some(CollectionId::from("pcol_summer")),
            category_id: Some(CategoryId::from("pcat_men")),
            options: vec![
                ConfigurableOption::new("Cor", ["Azul", "Branco"]),
                ConfigurableOption::new("Tamanho", ["P", "M", "G"]),
            ],
            variants: vec![
                Variant::priced("variant_shirt_p", 7990.0),
                Variant::priced("variant_shirt_g", 8990.0),
            ],
            ..product("prod_shirt")
        },
        CatalogItem {
            type_id: Some(ProductTypeId::from("ptyp_shoe")),
            collection_id: Some(CollectionId::from("pcol_winter")),
            options: vec![
                ConfigurableOption::new("Material", ["Couro"]),
                ConfigurableOption::new("Size", ["40", "41"]),
            ],
            variants: vec![Variant::priced("variant_shoe_40", 19990.0)],
            ..product("prod_shoe")
        },
        CatalogItem {
            status: ProductStatus::Draft,
            type_id: Some(ProductTypeId::from("ptyp_shirt")),
            options: vec![ConfigurableOption::new("Cor", ["Vermelho"])],
            variants: vec![Variant::priced("variant_draft", 100.0)],
            ..product("prod_draft")
        },
    ]
}

pub fn setup_app(catalog: Arc<dyn CatalogSource>, store: Arc<dyn FilterStore>) -> Router {
    init_router(AppState::new(catalog, store), None)
}

pub fn sample_app() -> (Router, Arc<InMemoryCatalog>, Arc<MemoryFilterStore>) {
    let catalog = Arc::new(InMemoryCatalog::new(sample_catalog()));
    let store = memory_store();
    (setup_app(catalog.clone(), store.clone()), catalog, store)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    get_with_headers(app, uri, &[]).await
}

pub async fn get_with_headers(app: &Router, uri: &str, headers: &[(&str, &str)]) -> TestResponse {
    let mut request = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = app
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}
