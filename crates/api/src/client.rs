//! HTTP plumbing shared by every endpoint.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::cache::{CacheKey, CacheValue};
use crate::error::ApiError;
use crate::types::{AuthToken, Envelope};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// How long catalog lookups stay cached.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Where the backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL including the API prefix, e.g. `https://shop.example/api/v1`.
    pub base_url: Url,
    pub timeout: Duration,
}

impl BackendConfig {
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the commerce backend.
///
/// Cheap to clone; all clones share one connection pool and cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path (e.g. `mailto:`)
    /// or the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bazaar/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub(crate) fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.inner.cache
    }

    /// Drop every cached catalog entry. Called after back-office writes.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    /// Build an endpoint URL from path segments. Each segment is
    /// percent-encoded, so keywords and slugs can be passed as typed.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request, attaching the token when one is given.
    pub(crate) fn request(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&AuthToken>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        let builder = self.inner.client.request(method, url);
        Ok(match token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token.expose()),
            None => builder,
        })
    }

    /// Send a request and return the body of a 2xx response.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_owned();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        let message = error_message(&text);
        tracing::warn!(
            status = %status,
            path = %url,
            message = %message,
            "Backend returned non-success status"
        );

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(if message.is_empty() {
                url
            } else {
                message
            }));
        }

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Send a request and decode the JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let text = self.send(request).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response uses the `{ success, message, ... }`
    /// envelope and unwrap the body.
    pub(crate) async fn send_envelope<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let envelope: Envelope<T> = self.send_json(request).await?;
        if envelope.success == Some(false) || envelope.error.is_some() {
            let message = envelope
                .error
                .or(envelope.message)
                .unwrap_or_default();
            tracing::debug!(message = %message, "Backend rejected request");
            return Err(ApiError::Rejected(message));
        }
        Ok(envelope.body)
    }
}

/// Pull `message` or `error` out of an error body, falling back to the
/// first 200 characters of the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key)?.as_str().map(str::to_owned))
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&BackendConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_appends_encoded_segments() {
        let client = client("http://backend.test/api/v1");
        let url = client.endpoint(&["product", "search", "red shoes"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://backend.test/api/v1/product/search/red%20shoes"
        );
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let client = client("http://backend.test/api/v1/");
        let url = client.endpoint(&["category", "get-category"]).unwrap();
        assert_eq!(url.as_str(), "http://backend.test/api/v1/category/get-category");
    }

    #[test]
    fn test_endpoint_encodes_slash_in_segment() {
        let client = client("http://backend.test/api/v1");
        let url = client.endpoint(&["product", "search", "a/b"]).unwrap();
        assert!(url.as_str().ends_with("/search/a%2Fb"));
    }

    #[test]
    fn test_rejects_non_base_url() {
        let config = BackendConfig::new(Url::parse("mailto:shop@example.com").unwrap());
        assert!(matches!(
            BackendClient::new(&config),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message": "Invalid Password"}"#), "Invalid Password");
        assert_eq!(error_message(r#"{"error": "boom"}"#), "boom");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
