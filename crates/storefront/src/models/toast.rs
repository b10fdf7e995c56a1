//! Transient notifications.
//!
//! HTMX responses announce a toast through the `HX-Trigger` header
//! (`{"showToast": {...}}`), which `static/js/app.js` renders. Full-page
//! redirects park the toast in the session instead and the layout pulls it
//! from `/toast` once.

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }

    /// `HX-Trigger` value that shows this toast and fires `events` too.
    #[must_use]
    pub fn trigger(&self, events: &[&str]) -> HeaderValue {
        let mut payload = serde_json::Map::new();
        for event in events {
            payload.insert((*event).to_string(), serde_json::Value::Null);
        }
        payload.insert(
            "showToast".to_string(),
            serde_json::json!({ "kind": self.kind, "message": self.message }),
        );

        let json = ascii_escaped(&serde_json::Value::Object(payload).to_string());
        HeaderValue::try_from(json).unwrap_or_else(|_| HeaderValue::from_static("{}"))
    }
}

/// Rewrites non-ASCII characters as `\uXXXX` escapes. Header values are read
/// as Latin-1, so raw UTF-8 would reach the browser garbled.
fn ascii_escaped(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_carries_toast_and_events() {
        let header = Toast::success("Item Added to cart").trigger(&["cart-updated"]);
        let value: serde_json::Value = serde_json::from_str(header.to_str().unwrap()).unwrap();

        assert_eq!(value["showToast"]["kind"], "success");
        assert_eq!(value["showToast"]["message"], "Item Added to cart");
        assert!(value.get("cart-updated").is_some());
    }

    #[test]
    fn test_trigger_without_events() {
        let header = Toast::error("Payment failed. Please try again.").trigger(&[]);
        let value: serde_json::Value = serde_json::from_str(header.to_str().unwrap()).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
        assert_eq!(value["showToast"]["kind"], "error");
    }

    #[test]
    fn test_trigger_escapes_non_ascii() {
        let header = Toast::error("Café déjà fermé 🛒").trigger(&[]);
        let raw = header.to_str().unwrap();
        assert!(raw.is_ascii());
        assert!(raw.contains("\\u00e9"));

        let value: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(value["showToast"]["message"], "Café déjà fermé 🛒");
    }
}
