//! Category management route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    response::{Html, Redirect},
};
use bazaar_core::CategoryId;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    middleware::RequireAdminAuth,
    models::Flash,
    state::AppState,
};

use super::{dashboard::AdminUserView, render};

/// Category view for templates.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Categories page template.
#[derive(Template)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub store_name: String,
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub categories: Vec<CategoryView>,
    pub error: Option<String>,
}

/// Create and rename form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
}

impl CategoryForm {
    fn name(&self) -> Option<&str> {
        let name = self.name.trim();
        (!name.is_empty()).then_some(name)
    }
}

/// Categories list with create, rename and delete forms.
///
/// GET /categories
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Html<String> {
    let (categories, error) = match state.backend().categories().await {
        Ok(categories) => (categories, None),
        Err(e) => {
            tracing::error!("Failed to load categories: {e}");
            (
                Vec::new(),
                Some("Something went wrong in getting category".to_string()),
            )
        }
    };

    render(&CategoriesTemplate {
        store_name: state.config().store_name.clone(),
        admin_user: AdminUserView::from(&admin),
        current_path: "/categories".to_string(),
        flash: Flash::take(&session).await,
        categories: categories
            .into_iter()
            .map(|c| CategoryView {
                id: c.id.to_string(),
                name: c.name,
                slug: c.slug,
            })
            .collect(),
        error,
    })
}

/// POST /categories
#[instrument(skip(admin, state, session))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let flash = match form.name() {
        None => Flash::error("Name is required"),
        Some(name) => match state.backend().create_category(&admin.token, name).await {
            Ok(_) => Flash::success(format!("{name} is created")),
            Err(e) => {
                tracing::error!(name, "Failed to create category: {e}");
                Flash::error(e.user_message())
            }
        },
    };

    flash.store(&session).await;
    Redirect::to("/categories")
}

/// POST /categories/{id}
#[instrument(skip(admin, state, session))]
pub async fn rename(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let id = CategoryId::new(id);
    let flash = match form.name() {
        None => Flash::error("Name is required"),
        Some(name) => match state.backend().update_category(&admin.token, &id, name).await {
            Ok(_) => Flash::success(format!("{name} is updated")),
            Err(e) => {
                tracing::error!(category_id = %id, "Failed to rename category: {e}");
                Flash::error(e.user_message())
            }
        },
    };

    flash.store(&session).await;
    Redirect::to("/categories")
}

/// POST /categories/{id}/delete
#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Redirect {
    let id = CategoryId::new(id);
    let flash = match state.backend().delete_category(&admin.token, &id).await {
        Ok(()) => Flash::success("Category is deleted"),
        Err(e) => {
            tracing::error!(category_id = %id, "Failed to delete category: {e}");
            Flash::error(e.user_message())
        }
    };

    flash.store(&session).await;
    Redirect::to("/categories")
}
