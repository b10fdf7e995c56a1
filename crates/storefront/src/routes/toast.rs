//! Flash toast fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;

use crate::models::Toast;
use crate::models::session::take_flash;

/// Pending toast fragment template (HTMX). Renders nothing when the session
/// holds no toast.
#[derive(Template, WebTemplate)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub toast: Option<Toast>,
}

/// Pop the flash toast queued by the last redirect (HTMX).
pub async fn show(session: Session) -> impl IntoResponse {
    ToastTemplate {
        toast: take_flash(&session).await,
    }
}
