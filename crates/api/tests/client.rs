//! `BackendClient` against an in-process fake backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use bazaar_api::{ApiError, AuthToken, BackendClient, BackendConfig};
use bazaar_core::cart::{Cart, CartItem};
use bazaar_core::search::Keyword;
use bazaar_core::{OrderId, OrderStatus, Price, ProductId};
use serde_json::{Value, json};
use url::Url;

#[derive(Clone, Default)]
struct Calls {
    categories: Arc<AtomicUsize>,
}

fn product_json(id: &str, slug: &str) -> Value {
    json!({
        "_id": id,
        "name": format!("Product {id}"),
        "slug": slug,
        "description": "A thing",
        "price": 19.99,
        "quantity": 4,
        "category": {"_id": "c1", "name": "Books", "slug": "books"}
    })
}

async fn categories(State(calls): State<Calls>) -> Json<Value> {
    calls.categories.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "success": true,
        "message": "All Categories List",
        "category": [{"_id": "c1", "name": "Books", "slug": "books"}]
    }))
}

async fn login(Json(body): Json<Value>) -> Json<Value> {
    if body["password"] == "secret" {
        Json(json!({
            "success": true,
            "message": "login successfully",
            "user": {"_id": "u1", "name": "Ada", "email": body["email"], "role": 0},
            "token": "tok-123"
        }))
    } else {
        Json(json!({"success": false, "message": "Invalid Password"}))
    }
}

async fn product(Path(slug): Path<String>) -> (StatusCode, Json<Value>) {
    if slug == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Product not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"success": true, "product": product_json("p1", &slug)})),
    )
}

async fn search(Path(keyword): Path<String>) -> Json<Value> {
    Json(json!([product_json("p1", &keyword.replace(' ', "-"))]))
}

async fn suggestions(Path(keyword): Path<String>) -> Json<Value> {
    Json(json!({"suggestions": [format!("{keyword} deluxe")]}))
}

async fn orders(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("tok-123") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Unauthorized"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!([{
            "_id": "o1",
            "products": [product_json("p1", "p1")],
            "payment": {"success": true},
            "buyer": {"_id": "u1", "name": "Ada"},
            "status": "Not Process",
            "createAt": "2024-03-01T10:00:00.000Z"
        }])),
    )
}

async fn order_status(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"_id": id, "status": body["status"]}))
}

async fn payment(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let cart = body["cart"].as_array().cloned().unwrap_or_default();
    if cart.iter().any(|item| item["_id"] == "declined") {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "declined"})));
    }
    (StatusCode::OK, Json(json!({"ok": true})))
}

async fn spawn_backend() -> (BackendClient, Calls) {
    let calls = Calls::default();
    let app = Router::new()
        .route("/api/v1/category/get-category", get(categories))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/product/get-product/{slug}", get(product))
        .route("/api/v1/product/search/{keyword}", get(search))
        .route("/api/v1/product/search-suggestions/{keyword}", get(suggestions))
        .route("/api/v1/auth/orders", get(orders))
        .route("/api/v1/auth/order-status/{id}", put(order_status))
        .route("/api/v1/product/braintree/payment", post(payment))
        .with_state(calls.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = Url::parse(&format!("http://{addr}/api/v1")).unwrap();
    let client = BackendClient::new(&BackendConfig::new(base)).unwrap();
    (client, calls)
}

#[tokio::test]
async fn test_categories_are_cached() {
    let (client, calls) = spawn_backend().await;

    let first = client.categories().await.unwrap();
    let second = client.categories().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].name, "Books");
    assert_eq!(calls.categories.load(Ordering::SeqCst), 1);

    client.invalidate_catalog().await;
    client.categories().await.unwrap();
    assert_eq!(calls.categories.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_login_success_and_rejection() {
    let (client, _) = spawn_backend().await;

    let session = client.login("ada@example.com", "secret").await.unwrap();
    assert_eq!(session.user.name, "Ada");
    assert_eq!(session.token.expose(), "tok-123");

    let err = client.login("ada@example.com", "nope").await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(ref m) if m == "Invalid Password"));
    assert_eq!(err.user_message(), "Invalid Password");
}

#[tokio::test]
async fn test_product_not_found() {
    let (client, _) = spawn_backend().await;

    let product = client.product("blue-mug").await.unwrap();
    assert_eq!(product.slug, "blue-mug");
    assert_eq!(product.price, Price::from_cents(1999));

    let err = client.product("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_search_encodes_keyword() {
    let (client, _) = spawn_backend().await;

    let results = client.search("red shoes").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].slug, "red-shoes");

    let keyword = Keyword::parse("mug").unwrap();
    let suggestions = client.search_suggestions(&keyword).await.unwrap();
    assert_eq!(suggestions, vec!["mug deluxe".to_string()]);
}

#[tokio::test]
async fn test_orders_require_token() {
    let (client, _) = spawn_backend().await;

    let orders = client.my_orders(&AuthToken::new("tok-123")).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::NotProcessed);
    assert!(orders[0].payment_succeeded());

    let err = client.my_orders(&AuthToken::new("bad")).await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_set_order_status() {
    let (client, _) = spawn_backend().await;
    client
        .set_order_status(
            &AuthToken::new("tok-123"),
            &OrderId::new("o1"),
            OrderStatus::Shipped,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_payment_declined() {
    let (client, _) = spawn_backend().await;
    let token = AuthToken::new("tok-123");

    let mut cart = Cart::default();
    cart.add(
        CartItem::new(ProductId::new("p1"), "Mug", Price::from_cents(500)),
        2,
    );
    client.pay(&token, &cart).await.unwrap();

    cart.add(
        CartItem::new(ProductId::new("declined"), "Lamp", Price::from_cents(900)),
        1,
    );
    let err = client.pay(&token, &cart).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_unreachable_backend_is_http_error() {
    let base = Url::parse("http://127.0.0.1:9/api/v1").unwrap();
    let client = BackendClient::new(&BackendConfig::new(base)).unwrap();
    let err = client.categories().await.unwrap_err();
    assert!(matches!(err, ApiError::Http(_)));
    assert_eq!(err.user_message(), "Something went wrong");
}
