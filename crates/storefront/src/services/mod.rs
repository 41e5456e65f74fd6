//! Business logic services for storefront.
//!
//! # Services
//!
//! - `checkout` - Order placement (preconditions, submission, state update)
//! - `returns` - Return (RMA) requests
//! - `trade` - Trade bulk ordering and volume pricing

pub mod checkout;
pub mod returns;
pub mod trade;
