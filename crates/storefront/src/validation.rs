//! Form validation for each checkout step and the support flows.
//!
//! Each form deserializes from the raw request body and converts itself into
//! a domain value with `validate`. Validation collects every failing field so
//! the UI can show all messages inline at once.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use paintshop_core::{Email, OrderId, ReturnReason};

use crate::backend::{ReturnLine, ReturnRequest};
use crate::cart::LineKey;
use crate::checkout::{CardBrand, PaymentMethod, ShippingAddress};

/// Countries we ship to.
const SUPPORTED_COUNTRIES: &[&str] = &["US"];

/// Longest free-text comment accepted on a return.
const MAX_COMMENT_LENGTH: usize = 1000;

/// Largest number of lines in one bulk order.
pub const MAX_BULK_LINES: usize = 200;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field-level failures for one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize)]
#[error("validation failed: {}", format_field_errors(&self.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message for a field, if it failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Trimmed value of a required text field, recording an error if blank.
    fn required(&mut self, field: &str, value: Option<&str>) -> String {
        let value = value.map(str::trim).unwrap_or_default();
        if value.is_empty() {
            self.add(field, "is required");
        }
        value.to_string()
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

// =============================================================================
// Shipping step
// =============================================================================

/// Shipping (or billing) address form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl AddressForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(self) -> Result<ShippingAddress, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let first_name = errors.required("first_name", self.first_name.as_deref());
        let last_name = errors.required("last_name", self.last_name.as_deref());
        let address1 = errors.required("address1", self.address1.as_deref());
        let city = errors.required("city", self.city.as_deref());

        let email_raw = errors.required("email", self.email.as_deref());
        let email = if email_raw.is_empty() {
            None
        } else {
            match Email::parse(&email_raw) {
                Ok(email) => Some(email),
                Err(e) => {
                    errors.add("email", e.to_string());
                    None
                }
            }
        };

        let phone = errors.required("phone", self.phone.as_deref());
        if !phone.is_empty() && !is_valid_phone(&phone) {
            errors.add("phone", "must contain 10 to 15 digits");
        }

        let state = errors
            .required("state", self.state.as_deref())
            .to_ascii_uppercase();
        if !state.is_empty()
            && !(state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic()))
        {
            errors.add("state", "must be a two-letter state code");
        }

        let postal_code = errors.required("postal_code", self.postal_code.as_deref());
        if !postal_code.is_empty() && !is_valid_zip(&postal_code) {
            errors.add("postal_code", "must be a 5-digit ZIP or ZIP+4");
        }

        let country = self
            .country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("US")
            .to_ascii_uppercase();
        if !SUPPORTED_COUNTRIES.contains(&country.as_str()) {
            errors.add("country", "we currently ship within the United States only");
        }

        let address2 = self
            .address2
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        match email {
            Some(email) if errors.is_empty() => Ok(ShippingAddress {
                first_name,
                last_name,
                email,
                phone,
                address1,
                address2,
                city,
                state,
                postal_code,
                country,
            }),
            _ => Err(errors),
        }
    }
}

fn is_valid_phone(phone: &str) -> bool {
    let allowed = |c: char| c.is_ascii_digit() || " -().+".contains(c);
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    phone.chars().all(allowed) && (10..=15).contains(&digits)
}

fn is_valid_zip(zip: &str) -> bool {
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    match zip.split_once('-') {
        None => zip.len() == 5 && all_digits(zip),
        Some((five, four)) => {
            five.len() == 5 && four.len() == 4 && all_digits(five) && all_digits(four)
        }
    }
}

// =============================================================================
// Payment step
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Card,
    Paypal,
    TradeAccount,
}

/// Payment step form. Only the fields for the chosen method are read.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentForm {
    pub method: PaymentKind,
    pub cardholder_name: Option<String>,
    pub card_number: Option<String>,
    /// `MM/YY` or `MM/YYYY`.
    pub expiry: Option<String>,
    pub cvc: Option<String>,
    pub paypal_email: Option<String>,
    pub account_number: Option<String>,
    pub purchase_order: Option<String>,
}

impl PaymentForm {
    /// Validate the form. `today` decides whether a card has expired.
    ///
    /// # Errors
    ///
    /// Returns every failing field for the chosen method.
    pub fn validate(self, today: NaiveDate) -> Result<PaymentMethod, ValidationErrors> {
        match self.method {
            PaymentKind::Card => self.validate_card(today),
            PaymentKind::Paypal => {
                let mut errors = ValidationErrors::default();
                let raw = errors.required("paypal_email", self.paypal_email.as_deref());
                if raw.is_empty() {
                    return Err(errors);
                }
                Email::parse(&raw)
                    .map(|email| PaymentMethod::PayPal { email })
                    .map_err(|e| {
                        errors.add("paypal_email", e.to_string());
                        errors
                    })
            }
            PaymentKind::TradeAccount => {
                let mut errors = ValidationErrors::default();
                let account_number = errors
                    .required("account_number", self.account_number.as_deref())
                    .to_ascii_uppercase();
                if !account_number.is_empty() && !is_trade_account(&account_number) {
                    errors.add("account_number", "must look like TR-12345");
                }
                let purchase_order = self
                    .purchase_order
                    .map(|po| po.trim().to_string())
                    .filter(|po| !po.is_empty());
                errors.finish(|| PaymentMethod::TradeAccount {
                    account_number,
                    purchase_order,
                })
            }
        }
    }

    fn validate_card(self, today: NaiveDate) -> Result<PaymentMethod, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let cardholder_name = errors.required("cardholder_name", self.cardholder_name.as_deref());

        let number: String = errors
            .required("card_number", self.card_number.as_deref())
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();
        if !number.is_empty() && !is_valid_card_number(&number) {
            errors.add("card_number", "is not a valid card number");
        }
        let brand = card_brand(&number);

        let expiry_raw = errors.required("expiry", self.expiry.as_deref());
        let expiry = if expiry_raw.is_empty() {
            None
        } else {
            match parse_expiry(&expiry_raw) {
                Some((month, year)) if (year, month) >= (today.year(), today.month()) => {
                    Some((month, year))
                }
                Some(_) => {
                    errors.add("expiry", "card has expired");
                    None
                }
                None => {
                    errors.add("expiry", "must be MM/YY");
                    None
                }
            }
        };

        let cvc = errors.required("cvc", self.cvc.as_deref());
        let cvc_len = if brand == CardBrand::Amex { 4 } else { 3 };
        if !cvc.is_empty() && !(cvc.len() == cvc_len && cvc.chars().all(|c| c.is_ascii_digit())) {
            errors.add("cvc", format!("must be {cvc_len} digits"));
        }

        match expiry {
            Some((expiry_month, expiry_year)) if errors.is_empty() => Ok(PaymentMethod::Card {
                cardholder_name,
                brand,
                last_four: number
                    .get(number.len().saturating_sub(4)..)
                    .unwrap_or_default()
                    .to_string(),
                expiry_month,
                expiry_year,
            }),
            _ => Err(errors),
        }
    }
}

/// Luhn checksum over 13-19 digits.
fn is_valid_card_number(number: &str) -> bool {
    if !(13..=19).contains(&number.len()) || !number.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = number
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

fn card_brand(number: &str) -> CardBrand {
    let prefix = |n: usize| number.get(..n).and_then(|p| p.parse::<u32>().ok());
    match (prefix(1), prefix(2), prefix(4)) {
        (Some(4), _, _) => CardBrand::Visa,
        (_, Some(34 | 37), _) => CardBrand::Amex,
        (_, Some(51..=55), _) | (_, _, Some(2221..=2720)) => CardBrand::Mastercard,
        (_, Some(65), _) | (_, _, Some(6011)) => CardBrand::Discover,
        _ => CardBrand::Other,
    }
}

fn parse_expiry(raw: &str) -> Option<(u32, i32)> {
    let (month, year) = raw.split_once('/')?;
    let month: u32 = month.trim().parse().ok()?;
    let year_str = year.trim();
    let year: i32 = year_str.parse().ok()?;
    let year = match year_str.len() {
        2 => 2000 + year,
        4 => year,
        _ => return None,
    };
    (1..=12).contains(&month).then_some((month, year))
}

fn is_trade_account(account: &str) -> bool {
    account
        .strip_prefix("TR-")
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}

// =============================================================================
// Returns
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnLineForm {
    pub product_id: String,
    pub color_id: String,
    pub finish_id: String,
    pub quantity: u32,
}

/// Return (RMA) request form.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnForm {
    pub order_id: Option<String>,
    #[serde(default)]
    pub items: Vec<ReturnLineForm>,
    pub reason: Option<String>,
    pub comments: Option<String>,
}

impl ReturnForm {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(self) -> Result<ReturnRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let order_id = errors.required("order_id", self.order_id.as_deref());

        if self.items.is_empty() {
            errors.add("items", "select at least one item to return");
        }
        for (i, line) in self.items.iter().enumerate() {
            if line.quantity == 0 {
                errors.add(format!("items[{i}].quantity"), "must be at least 1");
            }
        }

        let reason_raw = errors.required("reason", self.reason.as_deref());
        let reason = if reason_raw.is_empty() {
            None
        } else {
            reason_raw.parse::<ReturnReason>().map_or_else(
                |_| {
                    errors.add("reason", "is not a recognized return reason");
                    None
                },
                Some,
            )
        };

        let comments = self
            .comments
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if reason.is_some_and(|r| r.requires_comments()) && comments.is_none() {
            errors.add("comments", "please describe the problem");
        }
        if comments.as_ref().is_some_and(|c| c.chars().count() > MAX_COMMENT_LENGTH) {
            errors.add("comments", format!("must be at most {MAX_COMMENT_LENGTH} characters"));
        }

        match reason {
            Some(reason) if errors.is_empty() => Ok(ReturnRequest {
                order_id: OrderId::new(order_id),
                items: self
                    .items
                    .into_iter()
                    .map(|line| ReturnLine {
                        key: LineKey::new(line.product_id, line.color_id, line.finish_id),
                        quantity: line.quantity,
                    })
                    .collect(),
                reason,
                comments,
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Trade bulk ordering
// =============================================================================

/// One parsed line of a bulk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkLine {
    pub key: LineKey,
    pub quantity: u32,
}

/// Trade bulk order form: one `product,color,finish,quantity` per line.
///
/// Blank lines and lines starting with `#` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkOrderForm {
    pub lines: String,
}

impl BulkOrderForm {
    /// # Errors
    ///
    /// Returns one error per malformed line, keyed `lines[N]` (1-based).
    pub fn validate(&self) -> Result<Vec<BulkLine>, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let mut parsed = Vec::new();

        for (index, raw) in self.lines.lines().enumerate() {
            let raw = raw.trim();
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }
            let field = format!("lines[{}]", index + 1);
            let columns: Vec<&str> = raw.split(',').map(str::trim).collect();
            let [product, color, finish, quantity] = columns.as_slice() else {
                errors.add(field, "expected product,color,finish,quantity");
                continue;
            };
            if [product, color, finish].iter().any(|c| c.is_empty()) {
                errors.add(field, "product, color and finish are required");
                continue;
            }
            match quantity.parse::<u32>() {
                Ok(q) if q > 0 => parsed.push(BulkLine {
                    key: LineKey::new(*product, *color, *finish),
                    quantity: q,
                }),
                _ => errors.add(field, "quantity must be a whole number of at least 1"),
            }
        }

        if parsed.is_empty() && errors.is_empty() {
            errors.add("lines", "enter at least one line");
        }
        if parsed.len() > MAX_BULK_LINES {
            errors.add("lines", format!("at most {MAX_BULK_LINES} lines per order"));
        }

        errors.finish(|| parsed)
    }
}
