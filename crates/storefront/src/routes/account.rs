//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use bazaar_api::{AuthSession, ProfileUpdate};
use bazaar_core::account::{Order, User};
use bazaar_core::catalog::excerpt;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::Toast;
use crate::models::session::set_flash;
use crate::state::AppState;

/// Backend minimum for a new password.
const MIN_PASSWORD_LEN: usize = 6;

/// Description length in order rows.
const ORDER_EXCERPT_CHARS: usize = 30;

/// User display data for templates.
#[derive(Clone)]
pub struct UserView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
        }
    }
}

/// One product line inside an order.
#[derive(Clone)]
pub struct OrderLineView {
    pub id: String,
    pub name: String,
    pub excerpt: String,
    pub price: String,
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    /// 1-based position in the list.
    pub index: usize,
    pub status: &'static str,
    pub status_class: &'static str,
    pub buyer: String,
    pub date: String,
    pub paid: bool,
    pub quantity: usize,
    pub total: String,
    pub lines: Vec<OrderLineView>,
}

impl OrderView {
    #[must_use]
    pub fn new(index: usize, order: &Order) -> Self {
        Self {
            index: index + 1,
            status: order.status.as_str(),
            status_class: order.status.css_class(),
            buyer: order.buyer.name.clone(),
            date: order
                .created_at
                .map(|d| d.format("%b %e, %Y").to_string())
                .unwrap_or_default(),
            paid: order.payment_succeeded(),
            quantity: order.products.len(),
            total: order.total().display(),
            lines: order
                .products
                .iter()
                .map(|p| OrderLineView {
                    id: p.id.to_string(),
                    name: p.name.clone(),
                    excerpt: excerpt(&p.description, ORDER_EXCERPT_CHARS),
                    price: p.price.display(),
                })
                .collect(),
        }
    }
}

/// Profile form data. Email cannot be changed; a blank password keeps the
/// current one.
#[derive(Deserialize)]
pub struct ProfileForm {
    pub name: String,
    #[serde(default)]
    pub password: String,
    pub phone: String,
    pub address: String,
}

impl ProfileForm {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if !self.password.is_empty() && self.password.len() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        Ok(())
    }

    fn into_update(self, email: &str) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name.trim().to_string(),
            email: email.to_string(),
            password: self.password,
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        }
    }
}

/// Dashboard overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub store_name: String,
    pub user: UserView,
}

/// Profile form page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub store_name: String,
    pub user: UserView,
    pub error: Option<String>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub store_name: String,
    pub orders: Vec<OrderView>,
    pub error: Option<String>,
}

/// Display account overview page.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> impl IntoResponse {
    AccountIndexTemplate {
        store_name: state.store_name(),
        user: UserView::from(&auth.user),
    }
}

/// Display the profile form.
#[instrument(skip(state, auth))]
pub async fn profile_page(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> impl IntoResponse {
    ProfileTemplate {
        store_name: state.store_name(),
        user: UserView::from(&auth.user),
        error: None,
    }
}

/// Save the profile and refresh the user kept in the session.
#[instrument(skip(state, session, auth, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let retry = |user: UserView, error: String| {
        ProfileTemplate {
            store_name: state.store_name(),
            user,
            error: Some(error),
        }
        .into_response()
    };
    let submitted = UserView {
        name: form.name.clone(),
        email: auth.user.email.clone(),
        phone: form.phone.clone(),
        address: form.address.clone(),
    };

    if let Err(error) = form.validate() {
        return Ok(retry(submitted, error));
    }

    let update = form.into_update(&auth.user.email);
    let result = state.backend().update_profile(&auth.token, &update).await;
    match result {
        Ok(user) => {
            let refreshed = AuthSession {
                user,
                token: auth.token,
            };
            set_current_user(&session, &refreshed).await?;
            set_flash(&session, Toast::success("Profile Updated Successfully")).await;
            Ok(Redirect::to("/dashboard/user/profile").into_response())
        }
        Err(e) => {
            tracing::error!(user_id = %auth.user.id, "Profile update failed: {e}");
            Ok(retry(submitted, e.user_message()))
        }
    }
}

/// Display the signed-in user's orders.
#[instrument(skip(state, auth))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> impl IntoResponse {
    let (orders, error) = match state.backend().my_orders(&auth.token).await {
        Ok(orders) => (orders, None),
        Err(e) => {
            tracing::error!(user_id = %auth.user.id, "Failed to load orders: {e}");
            (Vec::new(), Some("Could not load your orders".to_string()))
        }
    };

    OrdersTemplate {
        store_name: state.store_name(),
        orders: orders
            .iter()
            .enumerate()
            .map(|(i, order)| OrderView::new(i, order))
            .collect(),
        error,
    }
}
