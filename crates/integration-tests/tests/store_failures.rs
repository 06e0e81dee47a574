//! Behavior when the document store fails underneath the services.

#![allow(clippy::unwrap_used)]

use atelier_core::{Product, ProductId};
use atelier_integration_tests::{TestContext, client, json};
use atelier_store::paths;
use reqwest::StatusCode;
use serde_json::json;

async fn seed_tee(ctx: &TestContext) {
    let tee: Product =
        serde_json::from_value(json!({"name": "Tee", "price": "80", "sizes": ["M"]})).unwrap();
    ctx.store()
        .put(&paths::product(&ProductId::new("tee")).unwrap(), &tee)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_cart_write_is_reported_and_not_applied() {
    let ctx = TestContext::start().await;
    seed_tee(&ctx).await;
    let shopper = ctx.shopper("ada@example.com").await;

    ctx.memory().fail_next_writes(1);
    let response = shopper
        .post(ctx.storefront("/cart/items"))
        .json(&json!({"productId": "tee", "size": "M"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let cart = json(shopper.get(ctx.storefront("/cart")).send().await.unwrap()).await;
    assert_eq!(cart["itemCount"], 0);

    let response = shopper
        .post(ctx.storefront("/cart/items"))
        .json(&json!({"productId": "tee", "size": "M"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_offline_store_fails_readiness_and_reads() {
    let ctx = TestContext::start().await;
    let http = client();

    let response = http.get(ctx.storefront("/health/ready")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.memory().set_available(false);

    let response = http.get(ctx.storefront("/health/ready")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let response = http.get(ctx.storefront("/products")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let response = http.get(ctx.admin("/health/ready")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Liveness does not depend on the store.
    let response = http.get(ctx.storefront("/health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.memory().set_available(true);
    let response = http.get(ctx.storefront("/health/ready")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
