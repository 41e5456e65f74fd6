//! Request and response payloads exchanged with the backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use paintshop_core::{OrderId, ReturnId, ReturnReason, ReturnStatus};

use crate::cart::{CartItem, LineKey};
use crate::catalog::ShippingOption;
use crate::checkout::{PaymentMethod, ShippingAddress};
use crate::pricing::OrderSummary;

/// Everything needed to place an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub billing_address: ShippingAddress,
    pub shipping_option: ShippingOption,
    pub payment_method: PaymentMethod,
    pub promo_code: Option<String>,
    pub summary: OrderSummary,
}

/// One line of a return request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLine {
    pub key: LineKey,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub order_id: OrderId,
    pub items: Vec<ReturnLine>,
    pub reason: ReturnReason,
    pub comments: Option<String>,
}

/// Acknowledgement of a filed return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnConfirmation {
    pub return_id: ReturnId,
    pub order_id: OrderId,
    pub status: ReturnStatus,
    /// Sum of the returned lines at their unit prices. Order-level promo
    /// discounts are not prorated into it.
    pub refund_estimate: Decimal,
    pub created_at: DateTime<Utc>,
}
