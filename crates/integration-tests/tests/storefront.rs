//! Storefront flows against the fake backend: cart, sign-in, checkout and
//! search suggestions.

#![allow(clippy::unwrap_used)]

use bazaar_integration_tests::backend::{SHOPPER_EMAIL, SHOPPER_PASSWORD};
use bazaar_integration_tests::{
    FakeBackend, TestApp, hx_trigger, location, spawn_storefront, unreachable_backend,
};
use reqwest::StatusCode;

async fn storefront() -> (FakeBackend, TestApp) {
    let backend = FakeBackend::spawn().await;
    let app = spawn_storefront(backend.api_url()).await;
    (backend, app)
}

async fn sign_in(app: &TestApp) {
    let response = app
        .post_form(
            "/login",
            &[("email", SHOPPER_EMAIL), ("password", SHOPPER_PASSWORD)],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

async fn add_rust_book(app: &TestApp) -> reqwest::Response {
    app.hx_post_form("/cart/add", &[("slug", "rust-book")]).await
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let (_backend, app) = storefront().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");

    let response = app.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_fails_without_backend() {
    let app = spawn_storefront(unreachable_backend()).await;
    let response = app.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_home_lists_products() {
    let (_backend, app) = storefront().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Rust Book"));
    assert!(body.contains("Watering Can"));
}

#[tokio::test]
async fn test_product_page_and_unknown_slug() {
    let (_backend, app) = storefront().await;

    let response = app.get("/products/rust-book").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Rust Book"));

    let response = app.get("/products/no-such-thing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_photo_is_proxied() {
    let (_backend, app) = storefront().await;

    let response = app.get("/photos/p-rust-book").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_add_then_add_again_increments() {
    let (_backend, app) = storefront().await;

    let response = add_rust_book(&app).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(hx_trigger(&response).contains("Item Added to cart"));
    assert!(response.text().await.unwrap().contains('1'));

    let response = add_rust_book(&app).await;
    assert!(hx_trigger(&response).contains("Quantity increased in cart"));

    let body = app.get("/cart").await.text().await.unwrap();
    assert!(body.contains("Rust Book"));
    assert!(body.contains("You have 1 items in your cart (2 units)"));
}

#[tokio::test]
async fn test_update_rejects_zero_quantity() {
    let (_backend, app) = storefront().await;
    add_rust_book(&app).await;

    let response = app
        .hx_post_form("/cart/update", &[("id", "p-rust-book"), ("quantity", "0")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(hx_trigger(&response).contains("Quantity must be at least 1"));

    let response = app
        .hx_post_form("/cart/update", &[("id", "p-rust-book"), ("quantity", "3")])
        .await;
    assert!(hx_trigger(&response).contains("Cart updated"));
    assert!(response.text().await.unwrap().contains("(3 units)"));
}

#[tokio::test]
async fn test_update_rejects_blank_and_garbled_quantity() {
    let (_backend, app) = storefront().await;
    add_rust_book(&app).await;

    for quantity in ["", "lots"] {
        let response = app
            .hx_post_form(
                "/cart/update",
                &[("id", "p-rust-book"), ("quantity", quantity)],
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK, "{quantity:?}");
        assert!(hx_trigger(&response).contains("Quantity must be at least 1"));
        assert!(response.text().await.unwrap().contains("(1 units)"));
    }
}

#[tokio::test]
async fn test_add_rejects_blank_and_negative_quantity() {
    let (_backend, app) = storefront().await;

    for quantity in ["", "-2"] {
        let response = app
            .hx_post_form("/cart/add", &[("slug", "rust-book"), ("quantity", quantity)])
            .await;
        assert_eq!(response.status(), StatusCode::OK, "{quantity:?}");
        assert!(hx_trigger(&response).contains("Quantity must be at least 1"));
    }

    let body = app.get("/cart").await.text().await.unwrap();
    assert!(body.contains("Your Cart Is Empty"));
}

#[tokio::test]
async fn test_remove_empties_cart() {
    let (_backend, app) = storefront().await;
    add_rust_book(&app).await;

    let response = app
        .hx_post_form("/cart/remove", &[("id", "p-rust-book")])
        .await;
    assert!(hx_trigger(&response).contains("Item removed from cart"));
    assert!(response.text().await.unwrap().contains("Your Cart Is Empty"));
}

#[tokio::test]
async fn test_cart_survives_login() {
    let (_backend, app) = storefront().await;
    add_rust_book(&app).await;
    sign_in(&app).await;

    let body = app.get("/cart").await.text().await.unwrap();
    assert!(body.contains("Rust Book"));
}

// ============================================================================
// Sign-in and checkout
// ============================================================================

#[tokio::test]
async fn test_login_with_wrong_password_shows_backend_message() {
    let (_backend, app) = storefront().await;

    let response = app
        .post_form(
            "/login",
            &[("email", SHOPPER_EMAIL), ("password", "not-the-password")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Invalid Password"));
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let (_backend, app) = storefront().await;
    add_rust_book(&app).await;

    let response = app.post_form("/checkout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_checkout_pays_and_clears_cart() {
    let (backend, app) = storefront().await;
    sign_in(&app).await;
    add_rust_book(&app).await;
    add_rust_book(&app).await;

    let response = app.post_form("/checkout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/user/orders");

    {
        let data = backend.data().await;
        assert_eq!(data.payments.len(), 1);
        let line = &data.payments[0][0];
        assert_eq!(line["_id"], "p-rust-book");
        assert_eq!(line["quantity"], 2);
    }

    let body = app.get("/cart").await.text().await.unwrap();
    assert!(body.contains("Your Cart Is Empty"));

    let response = app.get("/dashboard/user/orders").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Rust Book"));
}

#[tokio::test]
async fn test_declined_payment_keeps_cart() {
    let (backend, app) = storefront().await;
    backend.decline_payments().await;
    sign_in(&app).await;
    add_rust_book(&app).await;

    let response = app.post_form("/checkout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");

    assert!(backend.data().await.payments.is_empty());
    let body = app.get("/cart").await.text().await.unwrap();
    assert!(body.contains("Rust Book"));
}

#[tokio::test]
async fn test_empty_cart_checkout_is_refused() {
    let (backend, app) = storefront().await;
    sign_in(&app).await;

    let response = app.post_form("/checkout", &[]).await;
    assert_eq!(location(&response), "/cart");
    assert!(backend.data().await.payments.is_empty());
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_suggestions_come_from_backend() {
    let (_backend, app) = storefront().await;

    let body = app
        .hx_get("/search/suggest?keyword=rust")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Rust Book"));
    assert!(!body.contains("Popular matches"));
}

#[tokio::test]
async fn test_suggestions_fall_back_to_popular_terms() {
    let app = spawn_storefront(unreachable_backend()).await;

    let body = app
        .hx_get("/search/suggest?keyword=sho")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Popular matches"));
    assert!(body.contains("Shoes"));
}

#[tokio::test]
async fn test_unmatched_keyword_says_no_suggestions() {
    let (_backend, app) = storefront().await;

    let body = app
        .hx_get("/search/suggest?keyword=zzz")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("No suggestions found for"));
    assert!(body.contains("zzz"));
    assert!(body.contains("Popular searches"));
}

#[tokio::test]
async fn test_short_keyword_offers_popular_searches() {
    let (_backend, app) = storefront().await;

    let body = app
        .hx_get("/search/suggest?keyword=r")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Popular searches"));
    assert!(!body.contains("No suggestions found"));
}

#[tokio::test]
async fn test_search_remembers_keyword() {
    let (_backend, app) = storefront().await;

    let response = app.get("/search?keyword=watering").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Watering Can"));

    let body = app
        .hx_get("/search/suggest?keyword=")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Recent searches"));
    assert!(body.contains("watering"));
}
