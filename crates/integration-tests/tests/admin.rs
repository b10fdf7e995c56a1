//! Admin console flows against the fake backend: sign-in gate, catalog
//! management, order status and user management.

#![allow(clippy::unwrap_used)]

use bazaar_integration_tests::backend::{
    ADMIN_EMAIL, ADMIN_ID, ADMIN_PASSWORD, ORDER_ID, SHOPPER_EMAIL, SHOPPER_ID, SHOPPER_PASSWORD,
};
use bazaar_integration_tests::{FakeBackend, TestApp, location, spawn_admin};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};

const PHOTO: &[u8] = b"\x89PNG\r\n\x1a\n";

async fn admin() -> (FakeBackend, TestApp) {
    let backend = FakeBackend::spawn().await;
    let app = spawn_admin(backend.api_url()).await;
    (backend, app)
}

async fn signed_in_admin() -> (FakeBackend, TestApp) {
    let (backend, app) = admin().await;
    let response = app
        .post_form(
            "/auth/login",
            &[("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    (backend, app)
}

fn product_form(name: &str, photo: Option<&'static [u8]>) -> Form {
    let form = Form::new()
        .text("name", name.to_string())
        .text("description", "Hand-thrown stoneware")
        .text("price", "24.00")
        .text("quantity", "5")
        .text("category", "c-books")
        .text("shipping", "1");
    match photo {
        Some(bytes) => form.part(
            "photo",
            Part::bytes(bytes)
                .file_name("mug.png")
                .mime_str("image/png")
                .unwrap(),
        ),
        None => form,
    }
}

// ============================================================================
// Sign-in gate
// ============================================================================

#[tokio::test]
async fn test_pages_redirect_to_login_when_signed_out() {
    let (_backend, app) = admin().await;

    for path in ["/", "/categories", "/products", "/orders", "/users"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/auth/login", "{path}");
    }
}

#[tokio::test]
async fn test_htmx_request_gets_hx_redirect() {
    let (_backend, app) = admin().await;

    let response = app.hx_get("/orders").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()["hx-redirect"].to_str().unwrap(),
        "/auth/login"
    );
}

#[tokio::test]
async fn test_shopper_cannot_sign_in() {
    let (_backend, app) = admin().await;

    let response = app
        .post_form(
            "/auth/login",
            &[("email", SHOPPER_EMAIL), ("password", SHOPPER_PASSWORD)],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Access denied. Admin privileges required.")
    );

    let response = app.get("/").await;
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn test_wrong_password_shows_backend_message() {
    let (_backend, app) = admin().await;

    let response = app
        .post_form(
            "/auth/login",
            &[("email", ADMIN_EMAIL), ("password", "nope-nope")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Invalid Password"));
}

#[tokio::test]
async fn test_login_then_logout() {
    let (_backend, app) = signed_in_admin().await;

    let body = app.get("/").await.text().await.unwrap();
    assert!(body.contains("Grace Admin"));
    assert!(body.contains("Login Successfully"));

    let response = app.post_form("/auth/logout", &[]).await;
    assert_eq!(location(&response), "/auth/login");

    let response = app.get("/").await;
    assert_eq!(location(&response), "/auth/login");
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_category_create_rename_delete() {
    let (backend, app) = signed_in_admin().await;

    let response = app.post_form("/categories", &[("name", "Toys")]).await;
    assert_eq!(location(&response), "/categories");
    let body = app.get("/categories").await.text().await.unwrap();
    assert!(body.contains("Toys is created"));
    assert!(body.contains("Toys"));

    let id = {
        let data = backend.data().await;
        let toys = data
            .categories
            .iter()
            .find(|c| c["name"] == "Toys")
            .unwrap();
        toys["_id"].as_str().unwrap().to_string()
    };

    app.post_form(&format!("/categories/{id}"), &[("name", "Games")])
        .await;
    let body = app.get("/categories").await.text().await.unwrap();
    assert!(body.contains("Games is updated"));

    app.post_form(&format!("/categories/{id}/delete"), &[]).await;
    let body = app.get("/categories").await.text().await.unwrap();
    assert!(body.contains("Category is deleted"));
    assert_eq!(backend.data().await.categories.len(), 2);
}

#[tokio::test]
async fn test_blank_category_name_is_refused() {
    let (backend, app) = signed_in_admin().await;

    app.post_form("/categories", &[("name", "   ")]).await;
    let body = app.get("/categories").await.text().await.unwrap();
    assert!(body.contains("Name is required"));
    assert_eq!(backend.data().await.categories.len(), 2);
}

#[tokio::test]
async fn test_products_list_and_filter() {
    let (_backend, app) = signed_in_admin().await;

    let body = app.get("/products").await.text().await.unwrap();
    assert!(body.contains("Rust Book"));
    assert!(body.contains("Watering Can"));
    assert!(body.contains("Showing 2 of 2 products"));

    let body = app
        .get("/products?search=watering")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Watering Can"));
    assert!(body.contains("Showing 1 of 2 products"));
}

#[tokio::test]
async fn test_create_product_with_photo() {
    let (backend, app) = signed_in_admin().await;

    let response = app
        .client
        .post(app.url("/products"))
        .multipart(product_form("Stoneware Mug", Some(PHOTO)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products");

    let data = backend.data().await;
    let mug = data
        .products
        .iter()
        .find(|p| p["name"] == "Stoneware Mug")
        .unwrap();
    assert_eq!(mug["quantity"], 5);
    assert_eq!(mug["category"], "c-books");
    assert_eq!(mug["shipping"], true);
}

#[tokio::test]
async fn test_create_product_without_photo_is_refused() {
    let (backend, app) = signed_in_admin().await;

    let response = app
        .client
        .post(app.url("/products"))
        .multipart(product_form("Stoneware Mug", None))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Stoneware Mug"));
    assert_eq!(backend.data().await.products.len(), 2);
}

#[tokio::test]
async fn test_edit_and_delete_product() {
    let (backend, app) = signed_in_admin().await;

    let body = app
        .get("/products/edit/rust-book")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Rust Book"));

    let response = app
        .client
        .post(app.url("/products/p-rust-book"))
        .multipart(product_form("Rust Book 2nd Edition", None))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/products");
    assert!(
        backend
            .data()
            .await
            .products
            .iter()
            .any(|p| p["name"] == "Rust Book 2nd Edition")
    );

    app.post_form("/products/p-watering-can/delete", &[]).await;
    let body = app.get("/products").await.text().await.unwrap();
    assert!(body.contains("Product deleted successfully"));
    assert_eq!(backend.data().await.products.len(), 1);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_orders_page_shows_buyer_and_revenue() {
    let (_backend, app) = signed_in_admin().await;

    let body = app.get("/orders").await.text().await.unwrap();
    assert!(body.contains("Ada Shopper"));
    assert!(body.contains("Rust Book"));
    assert!(body.contains("$39.99"));
}

#[tokio::test]
async fn test_status_update_keeps_filters() {
    let (backend, app) = signed_in_admin().await;

    let response = app
        .post_form(
            &format!("/orders/{ORDER_ID}/status"),
            &[
                ("status", "Shipped"),
                ("search", "ada"),
                ("status_filter", ""),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/orders?search=ada&status=");
    assert_eq!(
        backend.data().await.order(ORDER_ID).unwrap()["status"],
        "Shipped"
    );

    let body = app.get("/orders").await.text().await.unwrap();
    assert!(body.contains("Order status updated successfully"));
}

#[tokio::test]
async fn test_unknown_status_is_bad_request() {
    let (backend, app) = signed_in_admin().await;

    let response = app
        .post_form(
            &format!("/orders/{ORDER_ID}/status"),
            &[("status", "Teleported")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        backend.data().await.order(ORDER_ID).unwrap()["status"],
        "Not Process"
    );
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_users_page_lists_accounts() {
    let (_backend, app) = signed_in_admin().await;

    let body = app.get("/users").await.text().await.unwrap();
    assert!(body.contains(SHOPPER_EMAIL));
    assert!(body.contains(ADMIN_EMAIL));
}

#[tokio::test]
async fn test_admin_account_cannot_be_deleted() {
    let (backend, app) = signed_in_admin().await;

    let response = app
        .post_form(&format!("/users/{ADMIN_ID}/delete"), &[])
        .await;
    assert_eq!(location(&response), "/users");
    assert_eq!(backend.data().await.user_ids().len(), 2);

    let body = app.get("/users").await.text().await.unwrap();
    assert!(body.contains("Admin accounts cannot be deleted"));
}

#[tokio::test]
async fn test_shopper_account_can_be_deleted() {
    let (backend, app) = signed_in_admin().await;

    app.post_form(&format!("/users/{SHOPPER_ID}/delete"), &[])
        .await;
    assert_eq!(backend.data().await.user_ids(), vec![ADMIN_ID.to_string()]);

    let body = app.get("/users").await.text().await.unwrap();
    assert!(body.contains("User deleted successfully"));
}
