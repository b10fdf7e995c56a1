//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Backend reachability check
//!
//! # Dashboard
//! GET  /                           - Admin profile overview
//!
//! # Auth (backend login, admin role only)
//! GET  /auth/login                 - Login page
//! POST /auth/login                 - Login action
//! POST /auth/logout                - Logout
//!
//! # Categories
//! GET  /categories                 - List with create/rename/delete forms
//! POST /categories                 - Create category
//! POST /categories/{id}            - Rename category
//! POST /categories/{id}/delete     - Delete category
//!
//! # Products
//! GET  /products                   - List (?search=&category=)
//! GET  /products/new               - Create form
//! POST /products                   - Create (multipart, photo required)
//! GET  /products/edit/{slug}       - Edit form
//! POST /products/{id}              - Update (multipart, photo optional)
//! POST /products/{id}/delete       - Delete product
//! GET  /photos/{id}                - Photo proxy
//!
//! # Orders
//! GET  /orders                     - List (?search=&status=) with revenue
//! POST /orders/{id}/status         - Change status
//!
//! # Users
//! GET  /users                      - List (?search=&role=) with stats
//! POST /users/{id}/delete          - Delete a shopper account
//! ```

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use askama::Template;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
};
use bazaar_core::catalog::MAX_PHOTO_BYTES;

use crate::state::AppState;

/// Room for the text fields next to a full-size photo.
const PRODUCT_FORM_LIMIT: usize = MAX_PHOTO_BYTES + 64 * 1024;

/// Render a page, falling back to a bare error string.
pub(crate) fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Build the auth router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
}

/// Build the catalog management router.
pub fn catalog_routes() -> Router<AppState> {
    let uploads = Router::new()
        .route("/products", post(products::create))
        .route("/products/{id}", post(products::update))
        .layer(DefaultBodyLimit::max(PRODUCT_FORM_LIMIT));

    Router::new()
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route("/categories/{id}", post(categories::rename))
        .route("/categories/{id}/delete", post(categories::delete))
        .route("/products", get(products::index))
        .route("/products/new", get(products::new_product))
        .route("/products/edit/{slug}", get(products::edit))
        .route("/products/{id}/delete", post(products::delete))
        .route("/photos/{id}", get(products::photo))
        .merge(uploads)
}

/// Build the order and user management router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/users", get(users::index))
        .route("/users/{id}/delete", post(users::delete))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .merge(auth_routes())
        .merge(catalog_routes())
        .merge(account_routes())
}
