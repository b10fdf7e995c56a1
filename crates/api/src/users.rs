//! Account, order and payment endpoints.

use bazaar_core::account::{Order, User};
use bazaar_core::cart::Cart;
use bazaar_core::{OrderId, OrderStatus, UserId};
use reqwest::Method;
use tracing::instrument;

use crate::client::BackendClient;
use crate::error::ApiError;
use crate::types::{
    AuthSession, AuthToken, Empty, LoginBody, LoginRequest, PaymentRequest, ProfileBody,
    ProfileUpdate, RegisterRequest, UserListBody,
};

impl BackendClient {
    // =========================================================================
    // Authentication
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the backend's wording ("Invalid
    /// Password", "Email is not registerd") on bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let request = self
            .request(Method::POST, &["auth", "login"], None)?
            .json(&LoginRequest { email, password });
        let body: LoginBody = self.send_envelope(request).await?;

        match (body.user, body.token) {
            (Some(user), Some(token)) => Ok(AuthSession { user, token }),
            _ => Err(ApiError::Rejected("Login response missing user or token".to_string())),
        }
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when the backend refuses the registration
    /// (e.g. the email is already registered).
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &RegisterRequest) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, &["auth", "register"], None)?
            .json(registration);
        let _: Empty = self.send_envelope(request).await?;
        Ok(())
    }

    /// Update the signed-in user's profile and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the backend's `error` (e.g. a
    /// password shorter than 6 characters).
    #[instrument(skip(self, token, update))]
    pub async fn update_profile(
        &self,
        token: &AuthToken,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        let request = self
            .request(Method::PUT, &["auth", "profile"], Some(token))?
            .json(update);
        let body: ProfileBody = self.send_envelope(request).await?;
        body.updated_user
            .ok_or_else(|| ApiError::Rejected("Profile response missing user".to_string()))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders placed by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        let request = self.request(Method::GET, &["auth", "orders"], Some(token))?;
        self.send_json(request).await
    }

    /// Every order (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn all_orders(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        let request = self.request(Method::GET, &["auth", "all-orders"], Some(token))?;
        self.send_json(request).await
    }

    /// Change an order's status (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(order_id = %id, status = %status))]
    pub async fn set_order_status(
        &self,
        token: &AuthToken,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let request = self
            .request(
                Method::PUT,
                &["auth", "order-status", id.as_str()],
                Some(token),
            )?
            .json(&serde_json::json!({ "status": status }));
        self.send(request).await?;
        Ok(())
    }

    /// Pay for the cart. The backend records the order on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payment is declined.
    #[instrument(skip(self, token, cart), fields(items = cart.line_count()))]
    pub async fn pay(&self, token: &AuthToken, cart: &Cart) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, &["product", "braintree", "payment"], Some(token))?
            .json(&PaymentRequest { cart: cart.items() });
        let _: Empty = self.send_envelope(request).await?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Every registered user (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn all_users(&self, token: &AuthToken) -> Result<Vec<User>, ApiError> {
        let request = self.request(Method::GET, &["auth", "all-users"], Some(token))?;
        let body: UserListBody = self.send_envelope(request).await?;
        Ok(body.users)
    }

    /// Delete a user (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn delete_user(&self, token: &AuthToken, id: &UserId) -> Result<(), ApiError> {
        let request = self.request(
            Method::DELETE,
            &["auth", "delete-user", id.as_str()],
            Some(token),
        )?;
        let _: Empty = self.send_envelope(request).await?;
        Ok(())
    }
}
