//! Authentication route handlers.
//!
//! Credentials are checked by the commerce backend; on success the returned
//! user and token are kept in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use bazaar_api::RegisterRequest;
use bazaar_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::Toast;
use crate::models::session::set_flash;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
    pub answer: String,
}

/// Values echoed back into the registration form after a failed attempt.
/// The password is never echoed.
#[derive(Clone, Default)]
pub struct RegisterValues {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub answer: String,
}

impl From<&RegisterForm> for RegisterValues {
    fn from(form: &RegisterForm) -> Self {
        Self {
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            address: form.address.clone(),
            answer: form.answer.clone(),
        }
    }
}

impl RegisterForm {
    /// Check that every field is present and the email is well formed.
    fn validate(&self) -> std::result::Result<Email, String> {
        let required = [
            ("Name", &self.name),
            ("Email", &self.email),
            ("Password", &self.password),
            ("Phone", &self.phone),
            ("Address", &self.address),
            ("Answer", &self.answer),
        ];
        if let Some((label, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(format!("{label} is required"));
        }
        Email::parse(&self.email).map_err(|e| e.to_string())
    }

    fn into_request(self, email: Email) -> RegisterRequest {
        RegisterRequest {
            name: self.name.trim().to_string(),
            email: email.into_inner(),
            password: self.password,
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            answer: self.answer.trim().to_string(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub store_name: String,
    pub email: String,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub store_name: String,
    pub values: RegisterValues,
    pub error: Option<String>,
}

/// Header account menu fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/auth_menu.html")]
pub struct AuthMenuTemplate {
    pub name: Option<String>,
    pub is_admin: bool,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(State(state): State<AppState>) -> impl IntoResponse {
    LoginTemplate {
        store_name: state.store_name(),
        email: String::new(),
        error: None,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let retry = |error: String| LoginTemplate {
        store_name: state.store_name(),
        email: form.email.clone(),
        error: Some(error),
    };

    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return Ok(retry(e.to_string()).into_response()),
    };
    if form.password.is_empty() {
        return Ok(retry("Password is required".to_string()).into_response());
    }

    match state.backend().login(email.as_str(), &form.password).await {
        Ok(auth) => {
            set_current_user(&session, &auth).await?;
            set_sentry_user(&auth.user.id, Some(&auth.user.email));
            tracing::info!(user_id = %auth.user.id, "Login succeeded");
            set_flash(&session, Toast::success("Login Successfully")).await;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            Ok(retry(e.user_message()).into_response())
        }
    }
}

/// Log out and return to the home page. The cart is kept.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    set_flash(&session, Toast::success("Logout Successfully")).await;
    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(State(state): State<AppState>) -> impl IntoResponse {
    RegisterTemplate {
        store_name: state.store_name(),
        values: RegisterValues::default(),
        error: None,
    }
}

/// Handle registration form submission.
///
/// The new account is not signed in; the shopper is sent to the login page.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let values = RegisterValues::from(&form);
    let retry = |error: String| {
        RegisterTemplate {
            store_name: state.store_name(),
            values: values.clone(),
            error: Some(error),
        }
        .into_response()
    };

    let email = match form.validate() {
        Ok(email) => email,
        Err(error) => return retry(error),
    };

    match state.backend().register(&form.into_request(email)).await {
        Ok(()) => {
            set_flash(
                &session,
                Toast::success("Register Successfully, please login"),
            )
            .await;
            Redirect::to("/login").into_response()
        }
        Err(e) => {
            tracing::warn!("Registration failed: {e}");
            retry(e.user_message())
        }
    }
}

// =============================================================================
// Fragments
// =============================================================================

/// Header account menu (HTMX).
pub async fn menu(OptionalAuth(auth): OptionalAuth) -> impl IntoResponse {
    match auth {
        Some(auth) => AuthMenuTemplate {
            is_admin: auth.user.is_admin(),
            name: Some(auth.user.name),
        },
        None => AuthMenuTemplate {
            name: None,
            is_admin: false,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> RegisterForm {
        RegisterForm {
            name: "Ada".to_string(),
            email: "ada@shop.test".to_string(),
            password: "hunter22".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Loop Rd".to_string(),
            answer: "chess".to_string(),
        }
    }

    #[test]
    fn test_register_form_requires_every_field() {
        let mut missing = form();
        missing.phone = "  ".to_string();
        assert_eq!(missing.validate().err().as_deref(), Some("Phone is required"));
    }

    #[test]
    fn test_register_form_rejects_bad_email() {
        let mut bad = form();
        bad.email = "not-an-email".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_register_request_is_trimmed() {
        let mut padded = form();
        padded.name = " Ada ".to_string();
        let email = padded.validate().unwrap();
        let request = padded.into_request(email);
        assert_eq!(request.name, "Ada");
        assert_eq!(request.email, "ada@shop.test");
    }
}
