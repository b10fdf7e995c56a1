//! Catalog endpoints: categories, products, search and photos.

use bazaar_core::catalog::{Category, Product, ProductDraft, ProductFilter};
use bazaar_core::search::Keyword;
use bazaar_core::{CategoryId, ProductId};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};

use crate::cache::{CacheKey, CacheValue};
use crate::client::BackendClient;
use crate::error::ApiError;
use crate::types::{
    AuthToken, CategoryBody, CategoryListBody, CategoryProducts, CategoryProductsBody, CountBody,
    Empty, Photo, PhotoUpload, ProductBody, ProductListBody, SuggestionsBody,
};

impl BackendClient {
    // =========================================================================
    // Categories
    // =========================================================================

    /// All categories. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache().get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let request = self.request(Method::GET, &["category", "get-category"], None)?;
        let body: CategoryListBody = self.send_envelope(request).await?;

        self.cache()
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(body.category.clone()),
            )
            .await;

        Ok(body.category)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it
    /// (e.g. duplicate name).
    #[instrument(skip(self, token))]
    pub async fn create_category(
        &self,
        token: &AuthToken,
        name: &str,
    ) -> Result<Option<Category>, ApiError> {
        let request = self
            .request(Method::POST, &["category", "create-category"], Some(token))?
            .json(&serde_json::json!({ "name": name }));
        let body: CategoryBody = self.send_envelope(request).await?;
        self.invalidate_catalog().await;
        Ok(body.category)
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        token: &AuthToken,
        id: &CategoryId,
        name: &str,
    ) -> Result<Option<Category>, ApiError> {
        let request = self
            .request(
                Method::PUT,
                &["category", "update-category", id.as_str()],
                Some(token),
            )?
            .json(&serde_json::json!({ "name": name }));
        let body: CategoryBody = self.send_envelope(request).await?;
        self.invalidate_catalog().await;
        Ok(body.category)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn delete_category(&self, token: &AuthToken, id: &CategoryId) -> Result<(), ApiError> {
        let request = self.request(
            Method::DELETE,
            &["category", "delete-category", id.as_str()],
            Some(token),
        )?;
        let _: Empty = self.send_envelope(request).await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Every product (back-office listing).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn all_products(&self) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, &["product", "get-product"], None)?;
        let body: ProductListBody = self.send_envelope(request).await?;
        Ok(body.products)
    }

    /// A product by slug. Cached.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when no product has this slug.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product(&self, slug: &str) -> Result<Product, ApiError> {
        let key = CacheKey::Product(slug.to_string());
        if let Some(CacheValue::Product(product)) = self.cache().get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let request = self.request(Method::GET, &["product", "get-product", slug], None)?;
        let body: ProductBody = self.send_envelope(request).await?;
        let product = body
            .product
            .ok_or_else(|| ApiError::NotFound(format!("Product not found: {slug}")))?;

        self.cache()
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// One page of the storefront listing (pages start at 1).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn product_page(&self, page: u32) -> Result<Vec<Product>, ApiError> {
        let page = page.max(1).to_string();
        let request = self.request(Method::GET, &["product", "product-list", &page], None)?;
        let body: ProductListBody = self.send_envelope(request).await?;
        Ok(body.products)
    }

    /// Total number of products, used to decide whether "load more" shows.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn product_count(&self) -> Result<u64, ApiError> {
        let request = self.request(Method::GET, &["product", "product-count"], None)?;
        let body: CountBody = self.send_envelope(request).await?;
        Ok(body.total)
    }

    /// Products matching a category and price filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn filter_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let request = self
            .request(Method::POST, &["product", "product-filters"], None)?
            .json(filter);
        let body: ProductListBody = self.send_envelope(request).await?;
        Ok(body.products)
    }

    /// Products related to `product` within its category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(product_id = %product, category_id = %category))]
    pub async fn related_products(
        &self,
        product: &ProductId,
        category: &CategoryId,
    ) -> Result<Vec<Product>, ApiError> {
        let request = self.request(
            Method::GET,
            &[
                "product",
                "related-product",
                product.as_str(),
                category.as_str(),
            ],
            None,
        )?;
        let body: ProductListBody = self.send_envelope(request).await?;
        Ok(body.products)
    }

    /// Products in the category with this slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn category_products(&self, slug: &str) -> Result<CategoryProducts, ApiError> {
        let request = self.request(Method::GET, &["product", "product-category", slug], None)?;
        let body: CategoryProductsBody = self.send_envelope(request).await?;
        Ok(CategoryProducts {
            category: body.category,
            products: body.products,
        })
    }

    /// Full-text product search. The backend answers with a bare array.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(keyword = %keyword))]
    pub async fn search(&self, keyword: &str) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, &["product", "search", keyword.trim()], None)?;
        self.send_json(request).await
    }

    /// Typeahead suggestions for a keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; callers fall back to the
    /// popular-terms list.
    #[instrument(skip(self), fields(keyword = %keyword.as_str()))]
    pub async fn search_suggestions(&self, keyword: &Keyword) -> Result<Vec<String>, ApiError> {
        let request = self.request(
            Method::GET,
            &["product", "search-suggestions", keyword.as_str()],
            None,
        )?;
        let body: SuggestionsBody = self.send_envelope(request).await?;
        Ok(body.suggestions)
    }

    /// Photo bytes for a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the product has no photo.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_photo(&self, id: &ProductId) -> Result<Photo, ApiError> {
        let request = self.request(
            Method::GET,
            &["product", "product-photo", id.as_str()],
            None,
        )?;
        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("Photo not found: {id}")));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: "photo unavailable".to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(Photo {
            content_type,
            bytes,
        })
    }

    /// Create a product. The backend requires a photo on create.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, token, draft, photo), fields(name = %draft.name))]
    pub async fn create_product(
        &self,
        token: &AuthToken,
        draft: &ProductDraft,
        photo: PhotoUpload,
    ) -> Result<(), ApiError> {
        let form = product_form(draft, Some(photo))?;
        let request = self
            .request(Method::POST, &["product", "create-product"], Some(token))?
            .multipart(form);
        let _: Empty = self.send_envelope(request).await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Update a product; the photo is only replaced when one is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, token, draft, photo), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        token: &AuthToken,
        id: &ProductId,
        draft: &ProductDraft,
        photo: Option<PhotoUpload>,
    ) -> Result<(), ApiError> {
        let form = product_form(draft, photo)?;
        let request = self
            .request(
                Method::PUT,
                &["product", "update-product", id.as_str()],
                Some(token),
            )?
            .multipart(form);
        let _: Empty = self.send_envelope(request).await?;
        self.invalidate_catalog().await;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, token: &AuthToken, id: &ProductId) -> Result<(), ApiError> {
        let request = self.request(
            Method::DELETE,
            &["product", "delete-product", id.as_str()],
            Some(token),
        )?;
        let _: Empty = self.send_envelope(request).await?;
        self.invalidate_catalog().await;
        Ok(())
    }
}

/// Multipart body for create/update product.
fn product_form(draft: &ProductDraft, photo: Option<PhotoUpload>) -> Result<Form, ApiError> {
    let mut form = Form::new()
        .text("name", draft.name.clone())
        .text("description", draft.description.clone())
        .text("price", draft.price.amount().to_string())
        .text("quantity", draft.quantity.to_string())
        .text("category", draft.category.to_string());

    if let Some(shipping) = draft.shipping {
        form = form.text("shipping", if shipping { "1" } else { "0" });
    }

    if let Some(photo) = photo {
        let part = Part::bytes(photo.bytes)
            .file_name(photo.file_name)
            .mime_str(&photo.content_type)?;
        form = form.part("photo", part);
    }

    Ok(form)
}
