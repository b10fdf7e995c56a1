//! Authentication route handlers for admin.
//!
//! Sign-in goes through the commerce backend; only accounts with the admin
//! role get a session here.

use askama::Template;
use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use bazaar_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, Flash};
use crate::state::AppState;

use super::render;

/// Shown when a valid login belongs to a non-admin account.
pub const ACCESS_DENIED: &str = "Access denied. Admin privileges required.";

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginPageTemplate {
    pub store_name: String,
    pub email: String,
    pub error: Option<String>,
    pub flash: Option<Flash>,
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Render the login page.
///
/// GET /auth/login
#[instrument(skip(state, session, admin))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAdminAuth(admin): OptionalAdminAuth,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }

    render(&LoginPageTemplate {
        store_name: state.config().store_name.clone(),
        email: String::new(),
        error: None,
        flash: Flash::take(&session).await,
    })
    .into_response()
}

/// Sign in through the backend and keep the admin in the session.
///
/// POST /auth/login
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let retry = |email: &str, error: &str| -> Html<String> {
        render(&LoginPageTemplate {
            store_name: state.config().store_name.clone(),
            email: email.to_string(),
            error: Some(error.to_string()),
            flash: None,
        })
    };

    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return Ok(retry(&form.email, &e.to_string()).into_response()),
    };
    if form.password.is_empty() {
        return Ok(retry(email.as_str(), "Password is required").into_response());
    }

    let auth = match state.backend().login(email.as_str(), &form.password).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(email = %email, "Admin login failed: {e}");
            return Ok(retry(email.as_str(), &e.user_message()).into_response());
        }
    };

    let admin = match CurrentAdmin::try_from(auth) {
        Ok(admin) => admin,
        Err(auth) => {
            tracing::warn!(user_id = %auth.user.id, "Non-admin account refused");
            return Ok(retry(email.as_str(), ACCESS_DENIED).into_response());
        }
    };

    set_current_admin(&session, &admin).await?;
    set_sentry_user(admin.id(), Some(&admin.user.email));
    tracing::info!(user_id = %admin.id(), "Admin signed in");

    Flash::success("Login Successfully").store(&session).await;
    Ok(Redirect::to("/").into_response())
}

/// Logout and clear session.
///
/// POST /auth/logout
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();

    Flash::success("Logout Successfully").store(&session).await;
    Ok(Redirect::to("/auth/login"))
}
