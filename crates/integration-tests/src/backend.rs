//! In-process fake of the commerce backend.
//!
//! Serves the REST endpoints the storefront and admin call, from an in-memory
//! catalog seeded with two categories, two products, one shopper, one admin
//! and one order. Responses use the backend's own shapes: `{ success,
//! message, ... }` envelopes for most endpoints, bare arrays for order lists
//! and product search, and the raw token in `Authorization`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use url::Url;

pub const SHOPPER_ID: &str = "u-shopper";
pub const SHOPPER_EMAIL: &str = "ada@example.com";
pub const SHOPPER_PASSWORD: &str = "correct-horse";
pub const ADMIN_ID: &str = "u-admin";
pub const ADMIN_EMAIL: &str = "grace@example.com";
pub const ADMIN_PASSWORD: &str = "battery-staple";
pub const ORDER_ID: &str = "o-1";

/// Products per page of `product-list`.
const PAGE_SIZE: usize = 6;

/// Fixed timestamp for records created by the fake.
const CREATED_AT: &str = "2026-03-01T12:00:00.000Z";

/// Stand-in photo bytes.
const PHOTO_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";

/// A registered account: the public user record plus its credentials.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: Value,
    pub password: String,
    pub token: String,
}

impl Account {
    fn id(&self) -> &str {
        self.user["_id"].as_str().unwrap_or_default()
    }

    fn is_admin(&self) -> bool {
        self.user["role"] == 1
    }
}

/// Everything the fake backend knows.
#[derive(Debug, Default)]
pub struct BackendData {
    pub categories: Vec<Value>,
    pub products: Vec<Value>,
    pub accounts: Vec<Account>,
    pub orders: Vec<Value>,
    /// Carts received by the payment endpoint, in order.
    pub payments: Vec<Vec<Value>>,
    /// When set, the payment endpoint refuses every request.
    pub decline_payments: bool,
    last_id: u32,
}

impl BackendData {
    /// Catalog, accounts and one order for the shopper.
    #[must_use]
    pub fn seeded() -> Self {
        let books = json!({ "_id": "c-books", "name": "Books", "slug": "books" });
        let garden = json!({ "_id": "c-garden", "name": "Garden", "slug": "garden" });

        let rust_book = json!({
            "_id": "p-rust-book",
            "name": "Rust Book",
            "slug": "rust-book",
            "description": "A practical guide to systems programming in Rust",
            "price": 39.99,
            "quantity": 10,
            "category": books,
            "shipping": true,
            "createdAt": "2026-01-10T09:00:00.000Z",
        });
        let watering_can = json!({
            "_id": "p-watering-can",
            "name": "Watering Can",
            "slug": "watering-can",
            "description": "Galvanised steel, two gallons",
            "price": 12.5,
            "quantity": 4,
            "category": "c-garden",
            "shipping": false,
            "createdAt": "2026-01-12T09:00:00.000Z",
        });

        let shopper = Account {
            user: json!({
                "_id": SHOPPER_ID,
                "name": "Ada Shopper",
                "email": SHOPPER_EMAIL,
                "phone": "555-0100",
                "address": "1 Analytical Way",
                "role": 0,
                "verified": true,
                "createdAt": "2026-01-01T08:00:00.000Z",
            }),
            password: SHOPPER_PASSWORD.to_string(),
            token: "token-shopper".to_string(),
        };
        let admin = Account {
            user: json!({
                "_id": ADMIN_ID,
                "name": "Grace Admin",
                "email": ADMIN_EMAIL,
                "phone": "555-0199",
                "address": "2 Compiler Court",
                "role": 1,
                "verified": true,
                "createdAt": "2025-12-01T08:00:00.000Z",
            }),
            password: ADMIN_PASSWORD.to_string(),
            token: "token-admin".to_string(),
        };

        let order = json!({
            "_id": ORDER_ID,
            "products": [rust_book],
            "payment": { "success": true },
            "buyer": { "_id": SHOPPER_ID, "name": "Ada Shopper" },
            "status": "Not Process",
            "createAt": "2026-02-01T10:30:00.000Z",
        });

        Self {
            categories: vec![books, garden],
            products: vec![rust_book, watering_can],
            accounts: vec![shopper, admin],
            orders: vec![order],
            ..Self::default()
        }
    }

    /// Ids of every registered user.
    #[must_use]
    pub fn user_ids(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.id().to_string()).collect()
    }

    #[must_use]
    pub fn order(&self, id: &str) -> Option<&Value> {
        self.orders.iter().find(|o| o["_id"] == id)
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.last_id += 1;
        format!("{prefix}-{}", self.last_id)
    }

    fn account(&self, headers: &HeaderMap) -> Result<&Account, Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        self.accounts
            .iter()
            .find(|a| !token.is_empty() && a.token == token)
            .ok_or_else(|| rejected(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }

    fn admin(&self, headers: &HeaderMap) -> Result<&Account, Response> {
        let account = self.account(headers)?;
        if account.is_admin() {
            Ok(account)
        } else {
            Err(rejected(StatusCode::UNAUTHORIZED, "UnAuthorized Access"))
        }
    }

    fn product_index(&self, id: &str) -> Option<usize> {
        self.products.iter().position(|p| p["_id"] == id)
    }
}

/// Handle to a running fake backend.
#[derive(Clone)]
pub struct FakeBackend {
    addr: SocketAddr,
    data: Arc<RwLock<BackendData>>,
}

impl FakeBackend {
    /// Start the fake on an ephemeral port with the seeded data.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let data = Arc::new(RwLock::new(BackendData::seeded()));
        let router = Router::new()
            .nest("/api/v1", routes())
            .with_state(Arc::clone(&data));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");
        tokio::spawn(async move { axum::serve(listener, router).await });

        Self { addr, data }
    }

    /// Base URL including the API prefix, as the apps expect it.
    ///
    /// # Panics
    ///
    /// Panics if the socket address does not form a URL.
    #[must_use]
    pub fn api_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/v1", self.addr)).expect("Invalid fake backend URL")
    }

    pub async fn data(&self) -> RwLockReadGuard<'_, BackendData> {
        self.data.read().await
    }

    pub async fn data_mut(&self) -> RwLockWriteGuard<'_, BackendData> {
        self.data.write().await
    }

    pub async fn decline_payments(&self) {
        self.data.write().await.decline_payments = true;
    }
}

type Shared = Arc<RwLock<BackendData>>;

fn routes() -> Router<Shared> {
    Router::new()
        .route("/category/get-category", get(list_categories))
        .route("/category/create-category", post(create_category))
        .route("/category/update-category/{id}", put(update_category))
        .route("/category/delete-category/{id}", delete(delete_category))
        .route("/product/get-product", get(list_products))
        .route("/product/get-product/{slug}", get(get_product))
        .route("/product/product-list/{page}", get(product_page))
        .route("/product/product-count", get(product_count))
        .route("/product/product-filters", post(filter_products))
        .route("/product/product-category/{slug}", get(category_products))
        .route("/product/related-product/{pid}/{cid}", get(related_products))
        .route("/product/search/{keyword}", get(search))
        .route("/product/search-suggestions/{keyword}", get(suggestions))
        .route("/product/product-photo/{id}", get(photo))
        .route("/product/create-product", post(create_product))
        .route("/product/update-product/{id}", put(update_product))
        .route("/product/delete-product/{id}", delete(delete_product))
        .route("/product/braintree/payment", post(payment))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/profile", put(update_profile))
        .route("/auth/orders", get(my_orders))
        .route("/auth/all-orders", get(all_orders))
        .route("/auth/order-status/{id}", put(set_order_status))
        .route("/auth/all-users", get(all_users))
        .route("/auth/delete-user/{id}", delete(delete_user))
}

fn rejected(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

fn ok(body: Value) -> Response {
    Json(body).into_response()
}

fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Category id of a product, whether populated or a bare reference.
fn category_id(product: &Value) -> Option<&str> {
    let category = &product["category"];
    category.as_str().or_else(|| category["_id"].as_str())
}

fn matches_keyword(product: &Value, keyword: &str) -> bool {
    let needle = keyword.to_lowercase();
    ["name", "description"].iter().any(|field| {
        product[*field]
            .as_str()
            .is_some_and(|text| text.to_lowercase().contains(&needle))
    })
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Deserialize)]
struct NameBody {
    name: String,
}

async fn list_categories(State(data): State<Shared>) -> Response {
    let data = data.read().await;
    ok(json!({ "success": true, "message": "All Categories List", "category": data.categories }))
}

async fn create_category(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NameBody>,
) -> Response {
    let mut data = data.write().await;
    if let Err(response) = data.admin(&headers) {
        return response;
    }
    if data.categories.iter().any(|c| c["name"] == body.name) {
        return rejected(StatusCode::OK, "Category Already Exisits");
    }

    let category = json!({
        "_id": data.next_id("c"),
        "name": body.name,
        "slug": slugify(&body.name),
    });
    data.categories.push(category.clone());
    ok(json!({ "success": true, "message": "new category created", "category": category }))
}

async fn update_category(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<NameBody>,
) -> Response {
    let mut data = data.write().await;
    if let Err(response) = data.admin(&headers) {
        return response;
    }
    let Some(category) = data.categories.iter_mut().find(|c| c["_id"] == id.as_str()) else {
        return rejected(StatusCode::NOT_FOUND, "Category not found");
    };

    category["slug"] = json!(slugify(&body.name));
    category["name"] = json!(body.name);
    let category = category.clone();
    ok(json!({ "success": true, "message": "Category Updated Successfully", "category": category }))
}

async fn delete_category(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = data.write().await;
    if let Err(response) = data.admin(&headers) {
        return response;
    }
    data.categories.retain(|c| c["_id"] != id.as_str());
    ok(json!({ "success": true, "message": "Category Deleted Successfully" }))
}

// =============================================================================
// Product reads
// =============================================================================

async fn list_products(State(data): State<Shared>) -> Response {
    let data = data.read().await;
    ok(json!({
        "success": true,
        "counTotal": data.products.len(),
        "products": data.products,
    }))
}

async fn get_product(State(data): State<Shared>, Path(slug): Path<String>) -> Response {
    let data = data.read().await;
    match data.products.iter().find(|p| p["slug"] == slug.as_str()) {
        Some(product) => ok(json!({ "success": true, "product": product })),
        None => ok(json!({ "success": true, "product": null })),
    }
}

async fn product_page(State(data): State<Shared>, Path(page): Path<usize>) -> Response {
    let data = data.read().await;
    let products: Vec<&Value> = data
        .products
        .iter()
        .skip(page.saturating_sub(1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();
    ok(json!({ "success": true, "products": products }))
}

async fn product_count(State(data): State<Shared>) -> Response {
    let data = data.read().await;
    ok(json!({ "success": true, "total": data.products.len() }))
}

#[derive(Debug, Default, Deserialize)]
struct FilterBody {
    #[serde(default)]
    checked: Vec<String>,
    #[serde(default)]
    radio: Vec<f64>,
}

async fn filter_products(State(data): State<Shared>, Json(filter): Json<FilterBody>) -> Response {
    let data = data.read().await;
    let bounds = match filter.radio.as_slice() {
        [min, max] => Some((*min, *max)),
        _ => None,
    };
    let products: Vec<&Value> = data
        .products
        .iter()
        .filter(|p| {
            filter.checked.is_empty()
                || category_id(p).is_some_and(|id| filter.checked.iter().any(|c| c == id))
        })
        .filter(|p| {
            bounds.is_none_or(|(min, max)| {
                p["price"]
                    .as_f64()
                    .is_some_and(|price| price >= min && price <= max)
            })
        })
        .collect();
    ok(json!({ "success": true, "products": products }))
}

async fn category_products(State(data): State<Shared>, Path(slug): Path<String>) -> Response {
    let data = data.read().await;
    let category = data.categories.iter().find(|c| c["slug"] == slug.as_str());
    let products: Vec<&Value> = category
        .and_then(|c| c["_id"].as_str())
        .map(|id| {
            data.products
                .iter()
                .filter(|p| category_id(p) == Some(id))
                .collect()
        })
        .unwrap_or_default();
    ok(json!({ "success": true, "category": category, "products": products }))
}

async fn related_products(
    State(data): State<Shared>,
    Path((pid, cid)): Path<(String, String)>,
) -> Response {
    let data = data.read().await;
    let products: Vec<&Value> = data
        .products
        .iter()
        .filter(|p| p["_id"] != pid.as_str() && category_id(p) == Some(cid.as_str()))
        .take(3)
        .collect();
    ok(json!({ "success": true, "products": products }))
}

async fn search(State(data): State<Shared>, Path(keyword): Path<String>) -> Response {
    let data = data.read().await;
    let products: Vec<&Value> = data
        .products
        .iter()
        .filter(|p| matches_keyword(p, &keyword))
        .collect();
    ok(json!(products))
}

async fn suggestions(State(data): State<Shared>, Path(keyword): Path<String>) -> Response {
    let data = data.read().await;
    let names: Vec<&str> = data
        .products
        .iter()
        .filter(|p| matches_keyword(p, &keyword))
        .filter_map(|p| p["name"].as_str())
        .collect();
    ok(json!({ "success": true, "suggestions": names }))
}

async fn photo(State(data): State<Shared>, Path(id): Path<String>) -> Response {
    let data = data.read().await;
    if data.product_index(&id).is_none() {
        return rejected(StatusCode::NOT_FOUND, "Photo not found");
    }
    ([(header::CONTENT_TYPE, "image/png")], PHOTO_BYTES).into_response()
}

// =============================================================================
// Product writes
// =============================================================================

/// Text fields of a product form, plus whether a photo was attached.
async fn read_product_form(mut multipart: Multipart) -> (HashMap<String, String>, bool) {
    let mut fields = HashMap::new();
    let mut has_photo = false;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "photo" {
            has_photo = field.bytes().await.is_ok_and(|bytes| !bytes.is_empty());
        } else {
            fields.insert(name, field.text().await.unwrap_or_default());
        }
    }
    (fields, has_photo)
}

fn apply_product_fields(product: &mut Value, fields: &HashMap<String, String>) {
    if let Some(name) = fields.get("name") {
        product["name"] = json!(name);
        product["slug"] = json!(slugify(name));
    }
    if let Some(description) = fields.get("description") {
        product["description"] = json!(description);
    }
    if let Some(price) = fields.get("price").and_then(|p| p.parse::<f64>().ok()) {
        product["price"] = json!(price);
    }
    if let Some(quantity) = fields.get("quantity").and_then(|q| q.parse::<u32>().ok()) {
        product["quantity"] = json!(quantity);
    }
    if let Some(category) = fields.get("category") {
        product["category"] = json!(category);
    }
    if let Some(shipping) = fields.get("shipping") {
        product["shipping"] = json!(shipping == "1");
    }
}

async fn create_product(
    State(data): State<Shared>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let (fields, has_photo) = read_product_form(multipart).await;
    let mut data = data.write().await;
    if let Err(response) = data.admin(&headers) {
        return response;
    }
    if !has_photo {
        return rejected(StatusCode::OK, "photo is Required and should be less then 1mb");
    }
    for required in ["name", "description", "price", "category", "quantity"] {
        if fields.get(required).is_none_or(String::is_empty) {
            return rejected(StatusCode::OK, &format!("{required} is Required"));
        }
    }

    let mut product = json!({ "_id": data.next_id("p"), "createdAt": CREATED_AT });
    apply_product_fields(&mut product, &fields);
    data.products.push(product.clone());
    ok(json!({ "success": true, "message": "Product Created Successfully", "products": product }))
}

async fn update_product(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    let (fields, _) = read_product_form(multipart).await;
    let mut data = data.write().await;
    if let Err(response) = data.admin(&headers) {
        return response;
    }
    let Some(index) = data.product_index(&id) else {
        return rejected(StatusCode::NOT_FOUND, "Product not found");
    };
    let Some(product) = data.products.get_mut(index) else {
        return rejected(StatusCode::NOT_FOUND, "Product not found");
    };

    apply_product_fields(product, &fields);
    let product = product.clone();
    ok(json!({ "success": true, "message": "Product Updated Successfully", "products": product }))
}

async fn delete_product(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = data.write().await;
    if let Err(response) = data.admin(&headers) {
        return response;
    }
    data.products.retain(|p| p["_id"] != id.as_str());
    ok(json!({ "success": true, "message": "Product Deleted successfully" }))
}

// =============================================================================
// Accounts and orders
// =============================================================================

#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(data): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let data = data.read().await;
    let Some(account) = data.accounts.iter().find(|a| a.user["email"] == body.email) else {
        return rejected(StatusCode::OK, "Email is not registerd");
    };
    if account.password != body.password {
        return rejected(StatusCode::OK, "Invalid Password");
    }
    ok(json!({
        "success": true,
        "message": "login successfully",
        "user": account.user,
        "token": account.token,
    }))
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
    phone: String,
    address: String,
}

async fn register(State(data): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut data = data.write().await;
    if data.accounts.iter().any(|a| a.user["email"] == body.email) {
        return rejected(StatusCode::OK, "Already Register please login");
    }

    let id = data.next_id("u");
    data.accounts.push(Account {
        user: json!({
            "_id": id,
            "name": body.name,
            "email": body.email,
            "phone": body.phone,
            "address": body.address,
            "role": 0,
            "verified": false,
            "createdAt": CREATED_AT,
        }),
        password: body.password,
        token: format!("token-{id}"),
    });
    ok(json!({ "success": true, "message": "User Register Successfully" }))
}

#[derive(Debug, Deserialize)]
struct ProfileBody {
    name: String,
    #[serde(default)]
    password: String,
    phone: String,
    address: String,
}

async fn update_profile(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ProfileBody>,
) -> Response {
    let mut data = data.write().await;
    let id = match data.account(&headers) {
        Ok(account) => account.id().to_string(),
        Err(response) => return response,
    };
    if !body.password.is_empty() && body.password.len() < 6 {
        return ok(json!({ "error": "Passsword is required and 6 character long" }));
    }
    let Some(account) = data.accounts.iter_mut().find(|a| a.id() == id) else {
        return rejected(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    account.user["name"] = json!(body.name);
    account.user["phone"] = json!(body.phone);
    account.user["address"] = json!(body.address);
    if !body.password.is_empty() {
        account.password = body.password;
    }
    ok(json!({
        "success": true,
        "message": "Profile Updated SUccessfully",
        "updatedUser": account.user,
    }))
}

async fn my_orders(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let data = data.read().await;
    let account = match data.account(&headers) {
        Ok(account) => account,
        Err(response) => return response,
    };
    let orders: Vec<&Value> = data
        .orders
        .iter()
        .filter(|o| o["buyer"]["_id"] == account.id())
        .collect();
    ok(json!(orders))
}

async fn all_orders(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let data = data.read().await;
    if let Err(response) = data.admin(&headers) {
        return response;
    }
    ok(json!(data.orders))
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

async fn set_order_status(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Response {
    let mut data = data.write().await;
    if let Err(response) = data.admin(&headers) {
        return response;
    }
    let Some(order) = data.orders.iter_mut().find(|o| o["_id"] == id.as_str()) else {
        return rejected(StatusCode::NOT_FOUND, "Order not found");
    };
    order["status"] = json!(body.status);
    ok(order.clone())
}

#[derive(Debug, Deserialize)]
struct PaymentBody {
    cart: Vec<Value>,
}

async fn payment(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<PaymentBody>,
) -> Response {
    let mut data = data.write().await;
    let buyer = match data.account(&headers) {
        Ok(account) => json!({ "_id": account.id(), "name": account.user["name"] }),
        Err(response) => return response,
    };
    if data.decline_payments {
        return rejected(StatusCode::OK, "Payment declined");
    }

    let order = json!({
        "_id": data.next_id("o"),
        "products": body.cart,
        "payment": { "success": true },
        "buyer": buyer,
        "status": "Not Process",
        "createAt": CREATED_AT,
    });
    data.orders.push(order);
    data.payments.push(body.cart);
    ok(json!({ "ok": true }))
}

async fn all_users(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let data = data.read().await;
    if let Err(response) = data.admin(&headers) {
        return response;
    }
    let users: Vec<&Value> = data.accounts.iter().map(|a| &a.user).collect();
    ok(json!({ "success": true, "users": users }))
}

async fn delete_user(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = data.write().await;
    if let Err(response) = data.admin(&headers) {
        return response;
    }
    data.accounts.retain(|a| a.id() != id);
    ok(json!({ "success": true, "message": "User deleted successfully" }))
}
