//! Checkout store: the four-step wizard and the form data it accumulates.
//!
//! ```text
//! Shipping (1) -> Payment (2) -> Review (3) -> Confirmation (4)
//! ```
//!
//! Field setters do no validation; the per-step forms in
//! [`crate::validation`] produce already-valid values. The store guards only
//! the wizard itself: steps are clamped to `[1, 4]`, `go_to_step` refuses to
//! skip past a step whose data is missing, and Confirmation is reachable only
//! once an order has been placed and is terminal after that.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use paintshop_core::{Email, OrderId, OrderStatus};

use crate::cart::CartItem;
use crate::catalog::{PromoCode, ShippingOption};
use crate::pricing::OrderSummary;

/// Errors raised by the wizard and by order preconditions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// A required form field has not been provided yet.
    #[error("cannot place order: missing {0}")]
    MissingField(&'static str),

    #[error("cannot place order: cart is empty")]
    EmptyCart,

    /// The discount exceeds the order value.
    #[error("cannot place order: total would be negative ({0})")]
    NegativeTotal(Decimal),

    #[error("step {requested} is locked until {missing} is provided")]
    StepLocked {
        requested: CheckoutStep,
        missing: &'static str,
    },

    #[error("an order has already been placed in this checkout")]
    AlreadyPlaced,
}

/// Wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Shipping,
    Payment,
    Review,
    Confirmation,
}

impl CheckoutStep {
    /// One-based step number, as shown in the progress bar.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Shipping => 1,
            Self::Payment => 2,
            Self::Review => 3,
            Self::Confirmation => 4,
        }
    }

    #[must_use]
    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Shipping),
            2 => Some(Self::Payment),
            3 => Some(Self::Review),
            4 => Some(Self::Confirmation),
            _ => None,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
            Self::Review => "Review",
            Self::Confirmation => "Confirmation",
        }
    }

    const fn next(self) -> Self {
        match self {
            Self::Shipping => Self::Payment,
            Self::Payment => Self::Review,
            Self::Review | Self::Confirmation => Self::Confirmation,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Shipping | Self::Payment => Self::Shipping,
            Self::Review => Self::Payment,
            Self::Confirmation => Self::Review,
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.number(), self.title())
    }
}

/// Postal address collected on the shipping step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub address1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    pub postal_code: String,
    /// Two-letter country code.
    pub country: String,
}

/// How the customer pays. Card numbers are reduced to brand + last four.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    Card {
        cardholder_name: String,
        brand: CardBrand,
        last_four: String,
        expiry_month: u32,
        expiry_year: i32,
    },
    #[serde(rename = "paypal")]
    PayPal {
        email: Email,
    },
    /// Net-30 invoicing for trade (B2B) accounts.
    TradeAccount {
        account_number: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        purchase_order: Option<String>,
    },
}

impl PaymentMethod {
    /// Short description for receipts, e.g. "Visa ending in 4242".
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Card {
                brand, last_four, ..
            } => format!("{brand} ending in {last_four}"),
            Self::PayPal { email } => format!("PayPal ({email})"),
            Self::TradeAccount { account_number, .. } => {
                format!("Trade account {account_number} (net 30)")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Other,
}

impl std::fmt::Display for CardBrand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Visa => "Visa",
            Self::Mastercard => "Mastercard",
            Self::Amex => "American Express",
            Self::Discover => "Discover",
            Self::Other => "Card",
        };
        f.write_str(name)
    }
}

/// Everything the wizard has collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFormData {
    pub shipping_address: Option<ShippingAddress>,
    /// Bill to the shipping address.
    pub same_as_shipping: bool,
    /// Used only when `same_as_shipping` is false.
    pub billing_address: Option<ShippingAddress>,
    pub shipping_option: Option<ShippingOption>,
    pub payment_method: Option<PaymentMethod>,
    pub promo_code: Option<PromoCode>,
}

impl Default for CheckoutFormData {
    fn default() -> Self {
        Self {
            shipping_address: None,
            same_as_shipping: true,
            billing_address: None,
            shipping_option: None,
            payment_method: None,
            promo_code: None,
        }
    }
}

impl CheckoutFormData {
    /// The address to bill, honoring `same_as_shipping`.
    #[must_use]
    pub fn effective_billing_address(&self) -> Option<&ShippingAddress> {
        if self.same_as_shipping {
            self.shipping_address.as_ref()
        } else {
            self.billing_address.as_ref()
        }
    }

    /// First required field that is still missing for order submission.
    #[must_use]
    pub fn first_missing(&self) -> Option<&'static str> {
        if self.shipping_address.is_none() {
            Some("shipping address")
        } else if self.shipping_option.is_none() {
            Some("shipping option")
        } else if self.payment_method.is_none() {
            Some("payment method")
        } else if self.effective_billing_address().is_none() {
            Some("billing address")
        } else {
            None
        }
    }
}

/// Produced once by a successful order submission; never modified after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub summary: OrderSummary,
    pub items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub shipping_option: ShippingOption,
    pub payment_summary: String,
    pub estimated_delivery: NaiveDate,
    pub mixing_instructions_url: String,
}

/// Wizard state for one checkout session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutStore {
    step: CheckoutStep,
    form: CheckoutFormData,
    order: Option<OrderConfirmation>,
}

impl CheckoutStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn form(&self) -> &CheckoutFormData {
        &self.form
    }

    #[must_use]
    pub const fn order(&self) -> Option<&OrderConfirmation> {
        self.order.as_ref()
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.order.is_some()
    }

    /// Advance one step. Stays on Review until an order has been placed.
    pub fn next_step(&mut self) {
        let next = self.step.next();
        if next == CheckoutStep::Confirmation && self.order.is_none() {
            return;
        }
        self.step = next;
    }

    /// Go back one step, never below Shipping. No-op once the order is placed.
    pub fn prev_step(&mut self) {
        if self.order.is_none() {
            self.step = self.step.prev();
        }
    }

    /// Jump directly to a step.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::StepLocked` if an earlier step's data is missing,
    /// and `CheckoutError::AlreadyPlaced` when leaving Confirmation.
    pub fn go_to_step(&mut self, step: CheckoutStep) -> Result<(), CheckoutError> {
        if self.order.is_some() {
            if step == CheckoutStep::Confirmation {
                self.step = step;
                return Ok(());
            }
            return Err(CheckoutError::AlreadyPlaced);
        }

        let locked = |missing| CheckoutError::StepLocked {
            requested: step,
            missing,
        };
        if step >= CheckoutStep::Payment {
            if self.form.shipping_address.is_none() {
                return Err(locked("shipping address"));
            }
            if self.form.shipping_option.is_none() {
                return Err(locked("shipping option"));
            }
        }
        if step >= CheckoutStep::Review && self.form.payment_method.is_none() {
            return Err(locked("payment method"));
        }
        if step == CheckoutStep::Confirmation {
            return Err(locked("a placed order"));
        }

        self.step = step;
        Ok(())
    }

    pub fn set_shipping_address(&mut self, address: ShippingAddress, same_as_shipping: bool) {
        self.form.shipping_address = Some(address);
        self.form.same_as_shipping = same_as_shipping;
        if same_as_shipping {
            self.form.billing_address = None;
        }
    }

    pub fn set_billing_address(&mut self, address: ShippingAddress) {
        self.form.billing_address = Some(address);
        self.form.same_as_shipping = false;
    }

    pub fn set_shipping_option(&mut self, option: ShippingOption) {
        self.form.shipping_option = Some(option);
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.form.payment_method = Some(method);
    }

    /// Apply or clear (`None`) the promo code.
    pub fn set_promo_code(&mut self, promo: Option<PromoCode>) {
        self.form.promo_code = promo;
    }

    /// Store the confirmation payload. The caller moves the wizard to
    /// Confirmation afterwards.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::AlreadyPlaced` if an order is already stored.
    pub fn set_order_data(&mut self, confirmation: OrderConfirmation) -> Result<(), CheckoutError> {
        if self.order.is_some() {
            return Err(CheckoutError::AlreadyPlaced);
        }
        self.order = Some(confirmation);
        Ok(())
    }

    /// Start over with an empty wizard.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
