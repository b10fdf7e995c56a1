//! Session store migrations.
//!
//! Shop data lives in the commerce backend, so the only local tables are the
//! tower-sessions records of each binary:
//!
//! - storefront: `tower_sessions.session`
//! - admin: `admin.session`
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! bazaar-cli migrate storefront
//!
//! # Create the admin session table
//! bazaar-cli migrate admin
//!
//! # Both
//! bazaar-cli migrate all
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for storefront
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for admin
//!
//! Both fall back to `DATABASE_URL`. Re-running is safe: the store only
//! creates what is missing.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

/// Errors from a migration run.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create the storefront session table.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    let database_url = database_url("STOREFRONT_DATABASE_URL")?;

    tracing::info!("Connecting to storefront database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Creating storefront session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}

/// Create the admin session table in the `admin` schema.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    let database_url = database_url("ADMIN_DATABASE_URL")?;

    tracing::info!("Connecting to admin database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Creating admin session table...");
    bazaar_admin::middleware::postgres_store(pool).migrate().await?;

    tracing::info!("Admin migrations complete!");
    Ok(())
}

/// Read `key`, falling back to `DATABASE_URL`.
fn database_url(key: &'static str) -> Result<SecretString, MigrationError> {
    std::env::var(key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar(key))
}
