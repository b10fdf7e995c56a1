//! Bazaar Core - Shared domain library.
//!
//! This crate provides the types and pure logic used across all Bazaar components:
//! - `api` - REST client for the commerce backend
//! - `storefront` - Public-facing shop
//! - `admin` - Back-office console for store administrators
//!
//! # Architecture
//!
//! The core crate contains only types and state transitions - no I/O, no HTTP
//! clients, no sessions. The cart reducer and the search-suggestion rules live
//! here so they can be unit-tested without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, roles and statuses
//! - [`catalog`] - Products, categories and listing filters
//! - [`account`] - Users, orders and back-office filters
//! - [`cart`] - Shopping cart state and totals
//! - [`search`] - Keyword rules, popular-term fallback and recent searches

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod search;
pub mod types;

pub use types::*;
