//! End-to-end tests for Bazaar.
//!
//! Each test starts a [`FakeBackend`] and the storefront or admin router on
//! ephemeral ports, then drives them over HTTP with a cookie-keeping client.
//! Sessions live in `MemoryStore`, so no database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```

pub mod backend;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use reqwest::{Client, Response, redirect::Policy};
use secrecy::SecretString;
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;
use url::Url;

pub use backend::FakeBackend;

/// High-entropy secret accepted by both apps' config checks.
const SESSION_SECRET: &str = "kQ8#vL2$mZ9!xR4@pW7&nT1*bY6^cF3%";

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// A backend URL nothing listens on.
///
/// # Panics
///
/// Panics if the URL literal is invalid.
#[must_use]
pub fn unreachable_backend() -> Url {
    Url::parse("http://127.0.0.1:9/api/v1").expect("Invalid URL literal")
}

/// A running app plus a client that keeps its cookies and does not follow
/// redirects, so tests can assert on `Location`.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

impl TestApp {
    fn new(addr: SocketAddr) -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");
        Self { addr, client }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET with the headers HTMX adds to its requests.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn hx_get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .header("HX-Request", "true")
            .send()
            .await
            .expect("HTMX GET request failed")
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn hx_post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("HTMX POST request failed")
    }
}

/// `Location` header of a redirect, or an empty string.
#[must_use]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Raw `HX-Trigger` header, or an empty string.
#[must_use]
pub fn hx_trigger(response: &Response) -> &str {
    response
        .headers()
        .get("hx-trigger")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind(SocketAddr::new(LOCALHOST, 0))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    (listener, addr)
}

/// Start the storefront against `backend_url`.
///
/// # Panics
///
/// Panics if the app cannot be built or bound.
pub async fn spawn_storefront(backend_url: Url) -> TestApp {
    use bazaar_storefront::{config::StorefrontConfig, middleware, state::AppState};

    let (listener, addr) = bind().await;
    let config = StorefrontConfig {
        database_url: SecretString::from("postgres://unused/storefront"),
        host: addr.ip(),
        port: addr.port(),
        base_url: format!("http://{addr}"),
        session_secret: SecretString::from(SESSION_SECRET),
        backend_url,
        store_name: "Bazaar".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };

    let session_layer = middleware::create_session_layer(MemoryStore::default(), &config);
    let state = AppState::new(config).expect("Failed to build storefront state");
    let router = bazaar_storefront::app(state, session_layer);

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    });

    TestApp::new(addr)
}

/// Start the admin console against `backend_url`.
///
/// # Panics
///
/// Panics if the app cannot be built or bound.
pub async fn spawn_admin(backend_url: Url) -> TestApp {
    use bazaar_admin::{config::AdminConfig, middleware, state::AppState};

    let (listener, addr) = bind().await;
    let config = AdminConfig {
        database_url: SecretString::from("postgres://unused/admin"),
        host: addr.ip(),
        port: addr.port(),
        base_url: format!("http://{addr}"),
        session_secret: SecretString::from(SESSION_SECRET),
        backend_url,
        store_name: "Bazaar".to_string(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };

    let session_layer = middleware::create_session_layer(MemoryStore::default(), &config);
    let state = AppState::new(config).expect("Failed to build admin state");
    let router = bazaar_admin::app(state, session_layer);

    tokio::spawn(async move { axum::serve(listener, router).await });

    TestApp::new(addr)
}
