//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use bazaar_core::ProductId;
use bazaar_core::catalog::Product;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Description length on grid cards.
pub const CARD_EXCERPT_CHARS: usize = 100;

/// Product card data for grids.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub excerpt: String,
    pub price: String,
    pub in_stock: bool,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, excerpt_chars: usize) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            excerpt: product.excerpt(excerpt_chars),
            price: product.price.display(),
            in_stock: product.in_stock(),
        }
    }
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self::new(product, CARD_EXCERPT_CHARS)
    }
}

/// Product detail data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: String,
    pub category: Option<String>,
    pub quantity: u32,
    pub in_stock: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            category: product
                .category
                .as_ref()
                .and_then(|c| c.name())
                .map(str::to_owned),
            quantity: product.quantity,
            in_stock: product.in_stock(),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub store_name: String,
    pub product: ProductView,
    pub related: Vec<ProductCard>,
}

/// Display a product with its related products.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Response> {
    let product = match state.backend().product(&slug).await {
        Ok(product) => product,
        Err(e) if e.is_not_found() => return Err(AppError::NotFound(slug)),
        Err(e) => return Err(e.into()),
    };

    // Related products are a nice-to-have; the page renders without them.
    let related = match product.category_id() {
        Some(category) => state
            .backend()
            .related_products(&product.id, category)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to load related products: {e}");
                Vec::new()
            }),
        None => Vec::new(),
    };

    Ok(ProductShowTemplate {
        store_name: state.store_name(),
        product: ProductView::from(&product),
        related: related.iter().map(ProductCard::from).collect(),
    }
    .into_response())
}

/// Proxy a product photo so pages only ever load same-origin images.
#[instrument(skip(state))]
pub async fn photo(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let photo = state.backend().product_photo(&ProductId::new(id)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, photo.content_type),
            (header::CACHE_CONTROL, "public, max-age=300".to_string()),
        ],
        photo.bytes,
    )
        .into_response())
}
