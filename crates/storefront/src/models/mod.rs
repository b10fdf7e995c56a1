//! Session-held state and view helpers.

pub mod session;
mod toast;

pub use session::keys as session_keys;
pub use toast::{Toast, ToastKind};
