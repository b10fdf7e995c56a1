//! Bazaar API - client for the commerce backend's REST interface.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local copies beyond a short cache
//! - JSON over HTTP via `reqwest`, base URL ending in `/api/v1`
//! - Category listings and product lookups are cached with `moka` (5 minute TTL)
//! - Calls that need a signed-in shopper take an [`AuthToken`], sent verbatim
//!   in the `Authorization` header
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_api::{BackendClient, BackendConfig};
//!
//! let client = BackendClient::new(&BackendConfig::new(base_url))?;
//!
//! let categories = client.categories().await?;
//! let page = client.product_page(1).await?;
//! let session = client.login("ada@shop.test", "hunter22").await?;
//! let orders = client.my_orders(&session.token).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod cache;
mod catalog;
mod client;
mod error;
mod users;

pub mod types;

pub use client::{BackendClient, BackendConfig};
pub use error::ApiError;
pub use types::*;
