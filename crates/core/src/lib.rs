//! Paintshop Core - Shared types library.
//!
//! This crate provides common types used across all Paintshop components:
//! - `storefront` - Cart, checkout, pricing and the mock backend behind them
//! - `cli` - Command-line tools for quoting carts and browsing reference data
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP, no randomness.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for catalog IDs, money, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
