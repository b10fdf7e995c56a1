//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use bazaar_core::catalog::Category;
use tracing::instrument;

use super::products::ProductCard;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub store_name: String,
    pub categories: Vec<Category>,
}

/// Header dropdown fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/categories_menu.html")]
pub struct CategoriesMenuTemplate {
    pub categories: Vec<Category>,
}

/// Products in one category.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub store_name: String,
    pub category: Category,
    pub products: Vec<ProductCard>,
}

/// Display all categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.backend().categories().await?;
    Ok(CategoriesTemplate {
        store_name: state.store_name(),
        categories,
    })
}

/// Header dropdown (HTMX). Renders empty on failure.
#[instrument(skip(state))]
pub async fn menu(State(state): State<AppState>) -> impl IntoResponse {
    let categories = state.backend().categories().await.unwrap_or_else(|e| {
        tracing::warn!("Failed to load categories menu: {e}");
        Vec::new()
    });
    CategoriesMenuTemplate { categories }
}

/// Display one category's products with a result count.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    let listing = state.backend().category_products(&slug).await?;
    let category = listing.category.ok_or(AppError::NotFound(slug))?;

    Ok(CategoryShowTemplate {
        store_name: state.store_name(),
        category,
        products: listing.products.iter().map(ProductCard::from).collect(),
    }
    .into_response())
}
