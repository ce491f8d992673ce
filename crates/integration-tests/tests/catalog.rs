//! Product catalog decoding and caching over HTTP.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::Method;
use mystore_cart::{ApiClient, ApiError, LineItem, MemoryStorage, Storefront};
use mystore_core::ProductId;
use mystore_integration_tests::StubBackend;
use rust_decimal::Decimal;

const PRODUCTS_PATH: &str = "/api/products";

const CATALOG: &str = r#"[
    {"_id":"65a1","name":"Mug","description":"Ceramic","price":12.5,"image":"mug.jpg","stock":4},
    {"_id":"65a2","name":"Poster","price":"8.00","stock":0}
]"#;

async fn client_for(body: &str) -> (StubBackend, ApiClient) {
    let backend = StubBackend::builder()
        .route(Method::GET, PRODUCTS_PATH, 200, body)
        .start()
        .await
        .unwrap();
    let client = ApiClient::new(&backend.api_config()).unwrap();
    (backend, client)
}

#[tokio::test]
async fn test_bare_array_catalog() {
    let (_backend, client) = client_for(CATALOG).await;

    let products = client.list_products().await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, ProductId::new("65a1"));
    assert_eq!(products[0].price, Decimal::new(125, 1));
    assert!(products[0].in_stock());
    assert_eq!(products[1].price, Decimal::new(8, 0));
    assert!(!products[1].in_stock());
}

#[tokio::test]
async fn test_wrapped_catalogs() {
    for body in [
        format!(r#"{{"products":{CATALOG}}}"#),
        format!(r#"{{"data":{CATALOG},"page":1}}"#),
    ] {
        let (_backend, client) = client_for(&body).await;
        assert_eq!(client.list_products().await.unwrap().len(), 2);
    }
}

#[tokio::test]
async fn test_unexpected_shape_is_decode_error() {
    let (_backend, client) = client_for(r#"{"items":[]}"#).await;

    let err = client.list_products().await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_catalog_is_cached_until_invalidated() {
    let (backend, client) = client_for(CATALOG).await;

    client.list_products().await.unwrap();
    client.list_products().await.unwrap();
    assert_eq!(backend.requests_to(PRODUCTS_PATH).len(), 1);

    client.invalidate_catalog();
    client.list_products().await.unwrap();
    assert_eq!(backend.requests_to(PRODUCTS_PATH).len(), 2);
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let backend = StubBackend::builder()
        .route(Method::GET, PRODUCTS_PATH, 503, r#"{"error":"Database unavailable"}"#)
        .start()
        .await
        .unwrap();
    let client = ApiClient::new(&backend.api_config()).unwrap();

    let err = client.list_products().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Api { status: 503, ref message } if message == "Database unavailable"
    ));
    assert!(client.list_products().await.is_err());
    assert_eq!(backend.requests_to(PRODUCTS_PATH).len(), 2);
}

#[tokio::test]
async fn test_single_product_lookup_feeds_cart() {
    let backend = StubBackend::builder()
        .route(
            Method::GET,
            "/api/products/65a1",
            200,
            r#"{"product":{"_id":"65a1","name":"Mug","price":12.5,"image":"mug.jpg","stock":4}}"#,
        )
        .route(
            Method::GET,
            "/api/products/65a2",
            200,
            r#"{"_id":"65a2","name":"Poster","price":8,"stock":0}"#,
        )
        .start()
        .await
        .unwrap();
    let storefront = Storefront::new(backend.cart_config(), MemoryStorage::shared()).unwrap();

    let mug = storefront.api().get_product(&ProductId::new("65a1")).await.unwrap();
    let cart = storefront
        .store()
        .add_item(LineItem::from_product(&mug, 2).unwrap())
        .unwrap();
    assert_eq!(cart.get("65a1").unwrap().unit_price, Decimal::new(125, 1));
    assert_eq!(cart.get("65a1").unwrap().image, "mug.jpg");

    let poster = storefront.api().get_product(&ProductId::new("65a2")).await.unwrap();
    assert!(LineItem::from_product(&poster, 1).is_err());
    assert!(LineItem::from_product(&mug, 5).is_err());
}
