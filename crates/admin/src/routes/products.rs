//! Product management route handlers.

use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use bazaar_api::PhotoUpload;
use bazaar_core::ProductId;
use bazaar_core::catalog::{
    Category, DraftError, MAX_PHOTO_BYTES, Product, ProductDraft, filter_products,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    components::{FilterOption, ListSummary},
    error::{AppError, Result},
    middleware::RequireAdminAuth,
    models::{CurrentAdmin, Flash},
    state::AppState,
};

use super::{dashboard::AdminUserView, render};

/// Description length in the products table.
const EXCERPT_CHARS: usize = 60;

/// Shown when the uploaded photo is over [`MAX_PHOTO_BYTES`].
pub const PHOTO_TOO_LARGE: &str = "Photo must be less than 5MB";

/// List filter query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category: String,
}

/// Product row for the list template.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub excerpt: String,
    pub price: String,
    pub quantity: u32,
    pub in_stock: bool,
    pub category: String,
}

impl ProductView {
    fn new(product: &Product, categories: &[Category]) -> Self {
        // The list endpoint may return the category as a bare id.
        let category = product
            .category
            .as_ref()
            .and_then(|c| {
                c.name().map(String::from).or_else(|| {
                    categories
                        .iter()
                        .find(|known| &known.id == c.id())
                        .map(|known| known.name.clone())
                })
            })
            .unwrap_or_else(|| "Uncategorized".to_string());

        Self {
            id: product.id.to_string(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            excerpt: product.excerpt(EXCERPT_CHARS),
            price: product.price.display(),
            quantity: product.quantity,
            in_stock: product.in_stock(),
            category,
        }
    }
}

/// Products list template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub store_name: String,
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub products: Vec<ProductView>,
    pub search: String,
    pub category_options: Vec<FilterOption>,
    pub summary: ListSummary,
    pub error: Option<String>,
}

/// Raw product form values, echoed back when the form is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFormValues {
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: String,
    pub category: String,
    /// `"1"`, `"0"` or empty.
    pub shipping: String,
}

impl ProductFormValues {
    fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount().to_string(),
            quantity: product.quantity.to_string(),
            category: product
                .category_id()
                .map(ToString::to_string)
                .unwrap_or_default(),
            shipping: match product.shipping {
                Some(true) => "1".to_string(),
                Some(false) => "0".to_string(),
                None => String::new(),
            },
        }
    }

    fn to_draft(&self) -> std::result::Result<ProductDraft, DraftError> {
        ProductDraft::parse(
            &self.name,
            &self.description,
            &self.price,
            &self.quantity,
            &self.category,
            &self.shipping,
        )
    }
}

/// A parsed product form submission.
#[derive(Debug, Default)]
pub struct ProductSubmission {
    pub values: ProductFormValues,
    /// `None` when the file input was left empty.
    pub photo: Option<PhotoUpload>,
}

impl ProductSubmission {
    /// Read every field of a product multipart form.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the body is not valid multipart.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "photo" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !bytes.is_empty() {
                    submission.photo = Some(PhotoUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            let values = &mut submission.values;
            match name.as_str() {
                "name" => values.name = value,
                "description" => values.description = value,
                "price" => values.price = value,
                "quantity" => values.quantity = value,
                "category" => values.category = value,
                "shipping" => values.shipping = value,
                _ => {}
            }
        }

        Ok(submission)
    }

    /// Validate the form. A photo is required when `photo_required`.
    fn validate(&self, photo_required: bool) -> std::result::Result<ProductDraft, String> {
        if photo_required && self.photo.is_none() {
            return Err(DraftError::MissingFields.to_string());
        }
        if self
            .photo
            .as_ref()
            .is_some_and(|photo| photo.bytes.len() > MAX_PHOTO_BYTES)
        {
            return Err(PHOTO_TOO_LARGE.to_string());
        }
        self.values.to_draft().map_err(|e| e.to_string())
    }
}

/// Create/edit product form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub store_name: String,
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    /// Product id when editing, `None` when creating.
    pub product_id: Option<String>,
    pub values: ProductFormValues,
    pub category_options: Vec<FilterOption>,
    pub error: Option<String>,
}

impl ProductFormTemplate {
    fn new(
        admin: &CurrentAdmin,
        state: &AppState,
        product_id: Option<String>,
        values: ProductFormValues,
        categories: &[Category],
    ) -> Self {
        let category_options = categories
            .iter()
            .map(|c| FilterOption::new(c.id.as_str(), &c.name, &values.category))
            .collect();
        let current_path = if product_id.is_some() {
            "/products"
        } else {
            "/products/new"
        };

        Self {
            store_name: state.config().store_name.clone(),
            admin_user: AdminUserView::from(admin),
            current_path: current_path.to_string(),
            flash: None,
            product_id,
            values,
            category_options,
            error: None,
        }
    }

    #[must_use]
    pub fn is_edit(&self) -> bool {
        self.product_id.is_some()
    }
}

/// Categories for the form select. A failure leaves the select empty.
async fn form_categories(state: &AppState) -> Vec<Category> {
    state.backend().categories().await.unwrap_or_else(|e| {
        tracing::error!("Failed to load categories: {e}");
        Vec::new()
    })
}

/// Products list with search and category filter.
///
/// GET /products
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ProductListQuery>,
) -> Html<String> {
    let (products, categories) = tokio::join!(
        state.backend().all_products(),
        state.backend().categories()
    );

    let (products, error) = match products {
        Ok(products) => (products, None),
        Err(e) => {
            tracing::error!("Failed to load products: {e}");
            (Vec::new(), Some("Something Went Wrong".to_string()))
        }
    };
    let categories = categories.unwrap_or_else(|e| {
        tracing::error!("Failed to load categories: {e}");
        Vec::new()
    });

    let shown = filter_products(&products, &query.search, &query.category);
    let category_options = FilterOption::with_all(
        "All Categories",
        categories.iter().map(|c| (c.id.as_str(), c.name.as_str())),
        &query.category,
    );

    render(&ProductsTemplate {
        store_name: state.config().store_name.clone(),
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        flash: Flash::take(&session).await,
        summary: ListSummary::new(shown.len(), products.len(), "products"),
        products: shown
            .into_iter()
            .map(|p| ProductView::new(p, &categories))
            .collect(),
        search: query.search,
        category_options,
        error,
    })
}

/// Empty create form.
///
/// GET /products/new
#[instrument(skip(admin, state))]
pub async fn new_product(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Html<String> {
    let categories = form_categories(&state).await;
    render(&ProductFormTemplate::new(
        &admin,
        &state,
        None,
        ProductFormValues::default(),
        &categories,
    ))
}

/// Create a product. Every field and the photo are required.
///
/// POST /products
#[instrument(skip(admin, state, session, multipart))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let submission = ProductSubmission::read(multipart).await?;

    let draft = match submission.validate(true) {
        Ok(draft) => draft,
        Err(error) => {
            return Ok(rerender(&admin, &state, None, submission.values, error).await);
        }
    };
    let Some(photo) = submission.photo else {
        return Err(AppError::BadRequest("photo is required".to_string()));
    };

    let result = state
        .backend()
        .create_product(&admin.token, &draft, photo)
        .await;
    match result {
        Ok(()) => {
            tracing::info!(name = %draft.name, "Product created");
            Flash::success("Product Created Successfully")
                .store(&session)
                .await;
            Ok(Redirect::to("/products").into_response())
        }
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::error!(name = %draft.name, "Failed to create product: {e}");
            Ok(rerender(&admin, &state, None, submission.values, e.user_message()).await)
        }
    }
}

/// Edit form prefilled from the backend.
///
/// GET /products/edit/{slug}
#[instrument(skip(admin, state))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>> {
    let (product, categories) =
        tokio::join!(state.backend().product(&slug), form_categories(&state));
    let product = product?;

    Ok(render(&ProductFormTemplate::new(
        &admin,
        &state,
        Some(product.id.to_string()),
        ProductFormValues::from_product(&product),
        &categories,
    )))
}

/// Update a product. The photo is only replaced when a new one is sent.
///
/// POST /products/{id}
#[instrument(skip(admin, state, session, multipart))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let submission = ProductSubmission::read(multipart).await?;

    let draft = match submission.validate(false) {
        Ok(draft) => draft,
        Err(error) => {
            return Ok(rerender(&admin, &state, Some(id), submission.values, error).await);
        }
    };

    let product_id = ProductId::new(id.clone());
    let result = state
        .backend()
        .update_product(&admin.token, &product_id, &draft, submission.photo)
        .await;
    match result {
        Ok(()) => {
            tracing::info!(product_id = %product_id, "Product updated");
            Flash::success("Product Updated Successfully")
                .store(&session)
                .await;
            Ok(Redirect::to("/products").into_response())
        }
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::error!(product_id = %product_id, "Failed to update product: {e}");
            Ok(rerender(&admin, &state, Some(id), submission.values, e.user_message()).await)
        }
    }
}

/// POST /products/{id}/delete
#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Redirect {
    let id = ProductId::new(id);
    let flash = match state.backend().delete_product(&admin.token, &id).await {
        Ok(()) => Flash::success("Product deleted successfully"),
        Err(e) => {
            tracing::error!(product_id = %id, "Failed to delete product: {e}");
            Flash::error("Failed to delete product")
        }
    };

    flash.store(&session).await;
    Redirect::to("/products")
}

/// Proxy a product photo so admin pages only load same-origin images.
///
/// GET /photos/{id}
#[instrument(skip(_admin, state))]
pub async fn photo(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let photo = state.backend().product_photo(&ProductId::new(id)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, photo.content_type),
            (header::CACHE_CONTROL, "private, max-age=60".to_string()),
        ],
        photo.bytes,
    )
        .into_response())
}

/// Render the form again with the submitted values and an error.
async fn rerender(
    admin: &CurrentAdmin,
    state: &AppState,
    product_id: Option<String>,
    values: ProductFormValues,
    error: String,
) -> Response {
    let categories = form_categories(state).await;
    let mut template = ProductFormTemplate::new(admin, state, product_id, values, &categories);
    template.error = Some(error);
    render(&template).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn values() -> ProductFormValues {
        ProductFormValues {
            name: "Lamp".to_string(),
            description: "Warm light".to_string(),
            price: "19.99".to_string(),
            quantity: "4".to_string(),
            category: "c1".to_string(),
            shipping: String::new(),
        }
    }

    fn photo(len: usize) -> PhotoUpload {
        PhotoUpload {
            file_name: "lamp.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn test_create_requires_photo() {
        let submission = ProductSubmission {
            values: values(),
            photo: None,
        };
        assert_eq!(
            submission.validate(true).unwrap_err(),
            "Please fill all required fields"
        );
        assert!(submission.validate(false).is_ok());
    }

    #[test]
    fn test_oversized_photo_rejected() {
        let submission = ProductSubmission {
            values: values(),
            photo: Some(photo(MAX_PHOTO_BYTES + 1)),
        };
        assert_eq!(submission.validate(true).unwrap_err(), PHOTO_TOO_LARGE);

        let submission = ProductSubmission {
            values: values(),
            photo: Some(photo(1024)),
        };
        assert!(submission.validate(true).is_ok());
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut values = values();
        values.category = String::new();
        let submission = ProductSubmission {
            values,
            photo: Some(photo(10)),
        };
        assert_eq!(
            submission.validate(true).unwrap_err(),
            "Please fill all required fields"
        );
    }
}
