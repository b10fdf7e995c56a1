//! Dashboard route handler.

use askama::Template;
use axum::{extract::State, response::Html};
use tower_sessions::Session;
use tracing::instrument;

use crate::{
    middleware::RequireAdminAuth,
    models::{CurrentAdmin, Flash},
    state::AppState,
};

use super::render;

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.user.name.clone(),
            email: admin.user.email.clone(),
            phone: admin.user.phone.clone(),
        }
    }
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub store_name: String,
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Option<Flash>,
}

/// Dashboard page handler.
#[instrument(skip(admin, state, session))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Html<String> {
    render(&DashboardTemplate {
        store_name: state.config().store_name.clone(),
        admin_user: AdminUserView::from(&admin),
        current_path: "/".to_string(),
        flash: Flash::take(&session).await,
    })
}
