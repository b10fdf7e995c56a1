//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use bazaar_api::{AuthSession, AuthToken};
use bazaar_core::UserId;
use bazaar_core::account::User;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session-stored admin identity.
///
/// Only built from a backend login whose user carries the admin role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Backend user record captured at login.
    pub user: User,
    /// Token sent with every back-office call.
    pub token: AuthToken,
}

impl CurrentAdmin {
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.user.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.user.name
    }
}

impl TryFrom<AuthSession> for CurrentAdmin {
    type Error = AuthSession;

    /// Hands the session back unchanged when the user is not an admin.
    fn try_from(auth: AuthSession) -> Result<Self, Self::Error> {
        if auth.user.is_admin() {
            Ok(Self {
                user: auth.user,
                token: auth.token,
            })
        } else {
            Err(auth)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// One-shot notice shown at the top of the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    /// CSS modifier for the notice banner.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "flash-success",
            FlashKind::Error => "flash-error",
        }
    }

    /// Queue this notice for the next page.
    ///
    /// A failed write is logged and dropped.
    pub async fn store(self, session: &Session) {
        if let Err(e) = session.insert(keys::FLASH, self).await {
            tracing::warn!("Failed to store flash: {e}");
        }
    }

    /// Pop the pending notice, if any.
    pub async fn take(session: &Session) -> Option<Self> {
        session.remove::<Self>(keys::FLASH).await.ok().flatten()
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the pending flash notice.
    pub const FLASH: &str = "admin_flash";
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::Role;

    fn session_for(role: Role) -> AuthSession {
        AuthSession {
            user: User {
                id: UserId::new("u1"),
                name: "Grace".to_string(),
                email: "grace@shop.test".to_string(),
                phone: "555-0101".to_string(),
                address: String::new(),
                role,
                verified: true,
                created_at: None,
                updated_at: None,
            },
            token: AuthToken::new("tok"),
        }
    }

    #[test]
    fn test_only_admins_become_current_admin() {
        let admin = CurrentAdmin::try_from(session_for(Role::Admin));
        assert!(admin.is_ok_and(|a| a.name() == "Grace"));

        let shopper = CurrentAdmin::try_from(session_for(Role::User));
        assert!(shopper.is_err());
    }

    #[test]
    fn test_flash_css_class() {
        assert_eq!(Flash::success("ok").css_class(), "flash-success");
        assert_eq!(Flash::error("no").css_class(), "flash-error");
    }
}
