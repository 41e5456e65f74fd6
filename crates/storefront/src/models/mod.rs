//! Session-backed state for storefront.

pub mod session;
