mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    FILTER_METADATA, FailingCatalog, FailingStore, get, get_with_headers, memory_store, product,
    sample_app, sample_catalog, setup_app,
};
use serde_json::json;
use vitrine::vitrine_cache::FilterStore;
use vitrine::vitrine_db::InMemoryCatalog;
use vitrine::vitrine_models::{
    CollectionId, ConfigurableOption, ContextKey, FilterSummary, PriceRange, ProductTypeId,
    Variant,
};

fn summary(count: u64, colors: &[&str]) -> FilterSummary {
    FilterSummary {
        price_range: PriceRange { min: 1, max: 2 },
        colors: colors.iter().map(|c| c.to_string()).collect(),
        product_count: count,
        ..FilterSummary::empty()
    }
}

fn by_type(ids: &[&str]) -> ContextKey {
    ContextKey::from_filters(
        ids.iter().map(|id| ProductTypeId::from(*id)),
        Vec::new(),
        Vec::new(),
    )
}

#[tokio::test]
async fn test_single_item_scenario_in_minor_units() {
    let mut item = product("prod_1");
    item.options = vec![ConfigurableOption::new("Color", ["Red", "Blue"])];
    item.variants = vec![Variant::priced("variant_1", 2500.0)];
    let app = setup_app(Arc::new(InMemoryCatalog::new(vec![item])), memory_store());

    let response = get(&app, FILTER_METADATA).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "priceRange": {"min": 25, "max": 25},
            "colors": ["Blue", "Red"],
            "styles": [],
            "sizes": [],
            "productCount": 1
        })
    );
}

#[tokio::test]
async fn test_fallback_aggregates_filtered_items_then_serves_exact() {
    let (app, catalog, _store) = sample_app();

    let first = get(&app, &format!("{FILTER_METADATA}?type_id=ptyp_shirt")).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header("x-filter-cache"), Some("fallback"));
    assert_eq!(
        first.body,
        json!({
            "priceRange": {"min": 79, "max": 90},
            "colors": ["Azul", "Branco"],
            "styles": [],
            "sizes": ["G", "M", "P"],
            "productCount": 1
        })
    );

    let second = get(&app, &format!("{FILTER_METADATA}?type_id=ptyp_shirt")).await;
    assert_eq!(second.header("x-filter-cache"), Some("exact"));
    assert_eq!(second.body, first.body);
    assert_eq!(catalog.calls(), 1);
}

#[tokio::test]
async fn test_global_fallback_covers_all_published_items() {
    let (app, _catalog, _store) = sample_app();

    let response = get(&app, FILTER_METADATA).await;

    assert_eq!(response.header("x-filter-cache"), Some("fallback"));
    assert_eq!(response.body["productCount"], 2);
    assert_eq!(response.body["styles"], json!(["Couro"]));
    assert_eq!(response.body["sizes"], json!(["40", "41", "G", "M", "P"]));
    assert_eq!(response.body["priceRange"], json!({"min": 79, "max": 200}));
}

#[tokio::test]
async fn test_exact_hit_skips_catalog_regardless_of_param_order() {
    let (app, catalog, store) = sample_app();
    let cached = summary(7, &["Preto"]);
    store.put_summary(&by_type(&["a", "b"]), &cached).await.unwrap();

    let response = get(
        &app,
        &format!("{FILTER_METADATA}?type_id=b&type_id=a&type_id=a"),
    )
    .await;

    assert_eq!(response.header("x-filter-cache"), Some("exact"));
    assert_eq!(response.body, serde_json::to_value(&cached).unwrap());
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn test_uncached_context_is_served_global_entry() {
    let (app, catalog, store) = sample_app();
    let global = summary(42, &["Verde"]);
    store.put_summary(&ContextKey::global(), &global).await.unwrap();

    let response = get(&app, &format!("{FILTER_METADATA}?collection_id=pcol_unknown")).await;

    assert_eq!(response.header("x-filter-cache"), Some("global"));
    assert_eq!(response.body, serde_json::to_value(&global).unwrap());
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn test_fallback_write_leaves_other_contexts_untouched() {
    let (app, _catalog, store) = sample_app();
    let shoes = summary(3, &["Marrom"]);
    store.put_summary(&by_type(&["ptyp_shoe"]), &shoes).await.unwrap();

    let response = get(&app, &format!("{FILTER_METADATA}?type_id=ptyp_shirt")).await;
    assert_eq!(response.header("x-filter-cache"), Some("fallback"));

    let stored = store
        .get_summaries(&[by_type(&["ptyp_shoe"]), by_type(&["ptyp_shirt"])])
        .await
        .unwrap();
    assert_eq!(stored[0], Some(shoes));
    assert_eq!(stored[1].as_ref().map(|s| s.product_count), Some(1));
}

#[tokio::test]
async fn test_concurrent_fallbacks_keep_every_context() {
    let (app, _catalog, store) = sample_app();

    let shirt_url = format!("{FILTER_METADATA}?type_id=ptyp_shirt");
    let shoe_url = format!("{FILTER_METADATA}?type_id=ptyp_shoe");
    let winter_url = format!("{FILTER_METADATA}?collection_id=pcol_winter");
    let (a, b, c) = tokio::join!(
        get(&app, &shirt_url),
        get(&app, &shoe_url),
        get(&app, &winter_url),
    );
    for response in [&a, &b, &c] {
        assert_eq!(response.header("x-filter-cache"), Some("fallback"));
    }

    let snapshot = store.load_snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 3);
    let winter = ContextKey::from_filters(Vec::new(), [CollectionId::from("pcol_winter")], Vec::new());
    assert_eq!(snapshot.get(&winter).unwrap().product_count, 1);
}

#[tokio::test]
async fn test_repeated_ids_match_any_listed_value() {
    let (app, _catalog, _store) = sample_app();

    let response = get(
        &app,
        &format!("{FILTER_METADATA}?type_id=ptyp_shirt&type_id=ptyp_shoe"),
    )
    .await;

    assert_eq!(response.body["productCount"], 2);
}

#[tokio::test]
async fn test_category_filter_restricts_fallback() {
    let (app, _catalog, _store) = sample_app();

    let response = get(&app, &format!("{FILTER_METADATA}?category_id=pcat_men")).await;

    assert_eq!(response.body["productCount"], 1);
    assert_eq!(response.body["colors"], json!(["Azul", "Branco"]));
}

#[tokio::test]
async fn test_empty_params_and_region_resolve_to_global() {
    let (app, _catalog, store) = sample_app();
    let global = summary(9, &[]);
    store.put_summary(&ContextKey::global(), &global).await.unwrap();

    let response = get(
        &app,
        &format!("{FILTER_METADATA}?type_id=&collection_id=&region_id=reg_eu"),
    )
    .await;

    assert_eq!(response.header("x-filter-cache"), Some("exact"));
    assert_eq!(response.body["productCount"], 9);
}

#[tokio::test]
async fn test_store_outage_still_serves_fallback() {
    let catalog = Arc::new(InMemoryCatalog::new(sample_catalog()));
    let app = setup_app(catalog.clone(), Arc::new(FailingStore));

    let response = get(&app, &format!("{FILTER_METADATA}?type_id=ptyp_shoe")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-filter-cache"), Some("fallback"));
    assert_eq!(response.body["styles"], json!(["Couro"]));
    assert_eq!(catalog.calls(), 1);
}

#[tokio::test]
async fn test_catalog_outage_degrades_to_empty_summary() {
    let app = setup_app(Arc::new(FailingCatalog), memory_store());

    let response = get(&app, &format!("{FILTER_METADATA}?type_id=ptyp_shirt")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-filter-cache"), Some("error"));
    assert_eq!(response.header("cache-control"), Some("no-store"));
    assert_eq!(
        response.body,
        json!({
            "priceRange": {"min": 0, "max": 1000},
            "colors": [],
            "styles": [],
            "sizes": [],
            "productCount": 0
        })
    );
}

#[tokio::test]
async fn test_total_outage_degrades_to_empty_summary() {
    let app = setup_app(Arc::new(FailingCatalog), Arc::new(FailingStore));

    let response = get(&app, FILTER_METADATA).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-filter-cache"), Some("error"));
    assert_eq!(response.body, serde_json::to_value(FilterSummary::empty()).unwrap());
}

#[tokio::test]
async fn test_cached_global_survives_catalog_outage() {
    let store = memory_store();
    store.put_summary(&ContextKey::global(), &summary(5, &["Azul"])).await.unwrap();
    let app = setup_app(Arc::new(FailingCatalog), store);

    let response = get(&app, &format!("{FILTER_METADATA}?type_id=ptyp_new")).await;

    assert_eq!(response.header("x-filter-cache"), Some("global"));
    assert_eq!(response.body["productCount"], 5);
}

#[tokio::test]
async fn test_too_many_ids_degrade_without_catalog_query() {
    let (app, catalog, _store) = sample_app();
    let query: Vec<String> = (0..101).map(|i| format!("type_id=ptyp_{i}")).collect();

    let response = get(&app, &format!("{FILTER_METADATA}?{}", query.join("&"))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("x-filter-cache"), Some("error"));
    assert_eq!(response.body["productCount"], 0);
    assert_eq!(catalog.calls(), 0);
}

#[tokio::test]
async fn test_success_is_publicly_cacheable() {
    let (app, _catalog, _store) = sample_app();

    let response = get(&app, FILTER_METADATA).await;

    assert_eq!(response.header("cache-control"), Some("public, max-age=60"));
    assert!(response.header("etag").is_some());
}

#[tokio::test]
async fn test_matching_etag_returns_not_modified() {
    let (app, _catalog, _store) = sample_app();
    let uri = format!("{FILTER_METADATA}?type_id=ptyp_shoe");

    let first = get(&app, &uri).await;
    let etag = first.header("etag").unwrap().to_string();

    let second = get_with_headers(&app, &uri, &[("if-none-match", etag.as_str())]).await;

    assert_eq!(second.status, StatusCode::NOT_MODIFIED);
    assert_eq!(second.header("etag"), Some(etag.as_str()));
    assert_eq!(second.header("x-filter-cache"), Some("exact"));
    assert_eq!(second.body, serde_json::Value::Null);
}
