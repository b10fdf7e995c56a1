//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Security headers (stricter CSP for admin, no framing)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Auth guard (`RequireAdminAuth` on every page but login)

pub mod auth;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin,
};
pub use session::{create_session_layer, postgres_store};
