//! Session middleware configuration for admin.
//!
//! `PostgreSQL`-backed sessions in the `admin` schema with stricter
//! security settings than the storefront (SameSite=Strict, 24hr expiry).

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "bazaar_admin_session";

/// Schema holding the admin session table.
pub const SESSION_SCHEMA: &str = "admin";

/// Admin session table name.
pub const SESSION_TABLE: &str = "session";

/// Session expiry time in seconds (24 hours - stricter than storefront).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// The `PostgreSQL` store for admin sessions.
///
/// The table must be created first: `bazaar-cli migrate admin`.
///
/// # Panics
///
/// Panics if the schema name or table name is invalid (should never happen
/// with the hardcoded values above).
#[must_use]
#[allow(clippy::expect_used)]
pub fn postgres_store(pool: PgPool) -> PostgresStore {
    PostgresStore::new(pool)
        .with_schema_name(SESSION_SCHEMA)
        .expect("valid schema name")
        .with_table_name(SESSION_TABLE)
        .expect("valid table name")
}

/// Create the session layer over `store`.
///
/// Production passes [`postgres_store`]; tests pass a `MemoryStore`.
#[must_use]
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &AdminConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        // SameSite=Strict for admin (stricter than storefront's Lax)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
