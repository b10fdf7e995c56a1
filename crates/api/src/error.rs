//! Errors returned by [`BackendClient`](crate::BackendClient).

use thiserror::Error;

/// Errors that can occur when talking to the commerce backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Backend answered 2xx but flagged the request as failed
    /// (`"success": false`).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Base URL cannot carry path segments.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// The backend rejected the caller's token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Status { status: 404, .. }
        )
    }

    /// A message fit for a toast: the backend's own wording for rejections,
    /// a generic line for transport and decoding failures.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(message) | Self::Status { message, .. } if !message.is_empty() => {
                message.clone()
            }
            Self::NotFound(_) => "Not found".to_string(),
            _ => "Something went wrong".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_backend_wording() {
        let err = ApiError::Rejected("Invalid Password".to_string());
        assert_eq!(err.user_message(), "Invalid Password");

        let err = ApiError::Status {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.user_message(), "Something went wrong");
    }

    #[test]
    fn test_status_classification() {
        let err = ApiError::Status {
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert!(err.is_unauthorized());
        assert!(!err.is_not_found());
        assert!(ApiError::NotFound("product".to_string()).is_not_found());
    }
}
