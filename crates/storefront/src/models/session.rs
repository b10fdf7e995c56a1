//! Session-stored shopper state.
//!
//! The cart, the recent-search list, the signed-in account and a one-shot
//! flash toast all live in the tower-sessions record keyed by the session
//! cookie, so they survive reloads.

use bazaar_core::cart::Cart;
use bazaar_core::search::RecentSearches;
use tower_sessions::Session;

use super::Toast;

/// Session keys for shopper data.
pub mod keys {
    /// Signed-in account (`bazaar_api::AuthSession`).
    pub const AUTH: &str = "auth";

    /// The cart.
    pub const CART: &str = "cart";

    /// Recent search terms, newest first.
    pub const RECENT_SEARCHES: &str = "recent_searches";

    /// Toast to show once on the next page load.
    pub const FLASH: &str = "flash";
}

/// Load the cart, or an empty one if the session has none.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Write the cart back after a mutation.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}

/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_recent_searches(
    session: &Session,
) -> Result<RecentSearches, tower_sessions::session::Error> {
    Ok(session
        .get::<RecentSearches>(keys::RECENT_SEARCHES)
        .await?
        .unwrap_or_default())
}

/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn save_recent_searches(
    session: &Session,
    recent: &RecentSearches,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::RECENT_SEARCHES, recent).await
}

/// Queue a toast for the next full page load.
///
/// Failures are logged; a lost toast is not worth failing the request.
pub async fn set_flash(session: &Session, toast: Toast) {
    if let Err(e) = session.insert(keys::FLASH, toast).await {
        tracing::warn!("Failed to store flash toast: {e}");
    }
}

/// Pop the pending toast, if any.
pub async fn take_flash(session: &Session) -> Option<Toast> {
    session.remove::<Toast>(keys::FLASH).await.ok().flatten()
}
