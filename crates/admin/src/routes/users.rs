//! User management route handlers.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use bazaar_core::UserId;
use bazaar_core::account::{User, UserStats, filter_users};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    components::{FilterOption, ListSummary},
    error::Result,
    middleware::RequireAdminAuth,
    models::Flash,
    state::AppState,
};

use super::{dashboard::AdminUserView, render};

/// List filter query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub role: String,
}

/// User row for templates.
#[derive(Debug, Clone)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub role_label: &'static str,
    pub is_admin: bool,
    pub verified: bool,
    pub joined: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            role_label: user.role.label(),
            is_admin: user.is_admin(),
            verified: user.verified,
            joined: user
                .created_at
                .map(|d| d.format("%b %e, %Y").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Users list template.
#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub store_name: String,
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
    pub users: Vec<UserView>,
    pub stats: UserStats,
    pub search: String,
    pub role_options: Vec<FilterOption>,
    pub summary: ListSummary,
}

/// Users list with search, role filter and header stats.
///
/// GET /users
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<UserListQuery>,
) -> Result<Html<String>> {
    let users = state.backend().all_users(&admin.token).await?;
    let shown = filter_users(&users, &query.search, &query.role);

    Ok(render(&UsersTemplate {
        store_name: state.config().store_name.clone(),
        admin_user: AdminUserView::from(&admin),
        current_path: "/users".to_string(),
        flash: Flash::take(&session).await,
        summary: ListSummary::new(shown.len(), users.len(), "users"),
        users: shown.into_iter().map(UserView::from).collect(),
        stats: UserStats::from_users(&users),
        role_options: FilterOption::with_all(
            "All Roles",
            [("admin", "Admin"), ("user", "User")],
            &query.role,
        ),
        search: query.search,
    }))
}

/// Delete a shopper account. Admin accounts are refused here as well as
/// hidden in the list.
///
/// POST /users/{id}/delete
#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = UserId::new(id);
    let users = state.backend().all_users(&admin.token).await?;

    let flash = match users.iter().find(|u| u.id == id) {
        None => Flash::error("User not found"),
        Some(user) if user.is_admin() => Flash::error("Admin accounts cannot be deleted"),
        Some(_) => match state.backend().delete_user(&admin.token, &id).await {
            Ok(()) => {
                tracing::info!(user_id = %id, "User deleted");
                Flash::success("User deleted successfully")
            }
            Err(e) if e.is_unauthorized() => return Err(e.into()),
            Err(e) => {
                tracing::error!(user_id = %id, "Failed to delete user: {e}");
                Flash::error("Failed to delete user")
            }
        },
    };

    flash.store(&session).await;
    Ok(Redirect::to("/users"))
}
