//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page (product grid + filters)
//! GET  /load-more               - Next page of cards (fragment)
//!
//! # Catalog
//! GET  /products/{slug}         - Product detail with related products
//! GET  /photos/{id}             - Product photo proxy
//! GET  /categories              - Category listing
//! GET  /categories/menu         - Header dropdown (fragment)
//! GET  /category/{slug}         - Products in a category
//!
//! # Search
//! GET  /search                  - Results page (records recent search)
//! GET  /search/suggest          - Suggestion dropdown (fragment)
//! POST /search/recent/remove    - Drop a recent search (fragment)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                    - Cart page
//! POST /cart/add                - Add to cart (triggers cart-updated)
//! POST /cart/update             - Update quantity (returns cart_items fragment)
//! POST /cart/remove             - Remove item (returns cart_items fragment)
//! GET  /cart/count              - Cart count badge (fragment)
//! POST /checkout                - Pay and empty the cart
//!
//! # Auth
//! GET  /login                   - Login page
//! POST /login                   - Login action
//! GET  /register                - Register page
//! POST /register                - Register action
//! POST /logout                  - Logout action
//! GET  /auth/menu               - Header account menu (fragment)
//!
//! # Dashboard (requires auth)
//! GET  /dashboard/user          - Account overview
//! GET  /dashboard/user/profile  - Profile form
//! POST /dashboard/user/profile  - Save profile
//! GET  /dashboard/user/orders   - Order history
//!
//! GET  /toast                   - Pending flash toast (fragment)
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod home;
pub mod products;
pub mod search;
pub mod toast;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
///
/// Credential submissions are rate limited per client IP.
pub fn auth_routes() -> Router<AppState> {
    let submissions = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .route("/auth/menu", get(auth::menu))
        .merge(submissions)
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products/{slug}", get(products::show))
        .route("/photos/{id}", get(products::photo))
        .route("/categories", get(categories::index))
        .route("/categories/menu", get(categories::menu))
        .route("/category/{slug}", get(categories::show))
}

/// Create the search routes router.
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search::results))
        .route("/search/suggest", get(search::suggest))
        .route("/search/recent/remove", post(search::remove_recent))
        .layer(api_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    let mutations = Router::new()
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/checkout", post(cart::checkout))
        .layer(api_rate_limiter());

    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/count", get(cart::count))
        .merge(mutations)
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route(
            "/profile",
            get(account::profile_page).post(account::update_profile),
        )
        .route("/orders", get(account::orders))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        .route("/load-more", get(home::load_more))
        .merge(catalog_routes())
        .merge(search_routes())
        .merge(cart_routes())
        .merge(auth_routes())
        .nest("/dashboard/user", account_routes())
        .route("/toast", get(toast::show))
}
