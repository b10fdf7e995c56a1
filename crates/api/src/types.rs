//! Request and response bodies for the backend endpoints.
//!
//! Domain records (`Product`, `Category`, `User`, `Order`) live in
//! `bazaar-core`; this module only holds the envelopes and payloads that are
//! specific to the wire.

use std::fmt;

use bazaar_core::account::User;
use bazaar_core::catalog::{Category, Product};
use bazaar_core::cart::CartItem;
use serde::{Deserialize, Serialize};

/// Token issued by `POST /auth/login`.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// A signed-in account: the user record plus the token for later calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    pub token: AuthToken,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
    /// Security answer used by the backend's password reset.
    pub answer: String,
}

/// Body of `PUT /auth/profile`.
///
/// An empty `password` keeps the current one.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
}

/// Products of one category plus the category itself.
#[derive(Debug, Clone)]
pub struct CategoryProducts {
    pub category: Option<Category>,
    pub products: Vec<Product>,
}

/// Product photo bytes as served by the backend.
#[derive(Debug, Clone)]
pub struct Photo {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A photo upload attached to a create/update product request.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Body of `POST /product/braintree/payment`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest<'a> {
    pub cart: &'a [CartItem],
}

// =============================================================================
// Envelopes
// =============================================================================

/// Common `{ success, message, ...body }` wrapper.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CategoryListBody {
    #[serde(default)]
    pub category: Vec<Category>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CategoryBody {
    #[serde(default)]
    pub category: Option<Category>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductListBody {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductBody {
    #[serde(default)]
    pub product: Option<Product>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CountBody {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CategoryProductsBody {
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SuggestionsBody {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginBody {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<AuthToken>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfileBody {
    #[serde(default, rename = "updatedUser")]
    pub updated_user: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserListBody {
    #[serde(default)]
    pub users: Vec<User>,
}

/// Body of endpoints that only report success.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Empty {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_token_debug_is_redacted() {
        let token = AuthToken::new("eyJhbGciOi.secret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_envelope_flattens_body() {
        let json = r#"{"success": true, "message": "ok", "total": 42}"#;
        let envelope: Envelope<CountBody> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.success, Some(true));
        assert_eq!(envelope.body.total, 42);
    }

    #[test]
    fn test_envelope_tolerates_missing_body_on_failure() {
        let json = r#"{"success": false, "message": "Email is not registerd"}"#;
        let envelope: Envelope<LoginBody> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.success, Some(false));
        assert!(envelope.body.user.is_none());
    }
}
