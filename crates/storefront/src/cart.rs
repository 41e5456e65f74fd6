//! Cart store.
//!
//! Holds the visitor's line items. A line is identified by the triple
//! `(product, color, finish)`; adding an existing triple merges quantities
//! instead of appending a duplicate line.
//!
//! The store does no I/O. Callers resolve items against the catalog before
//! adding them, and the store only enforces structural rules: quantities are
//! at least one, prices are non-negative.
//!
//! A line added through a trade order stays trade-priced: whenever its
//! quantity changes, its unit price follows the volume tier for the new total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use paintshop_core::{ColorId, FinishId, ProductId};

use crate::pricing::trade_unit_price;

/// Largest quantity a single line may hold.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// Errors raised by cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Zero quantities are rejected. Use `remove_item` to drop a line.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("quantity for {0} exceeds the per-line limit of {max}", max = MAX_LINE_QUANTITY)]
    QuantityTooLarge(LineKey),

    #[error("unit price cannot be negative (got {0})")]
    InvalidPrice(Decimal),
}

/// Identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub color_id: ColorId,
    pub finish_id: FinishId,
}

impl LineKey {
    #[must_use]
    pub fn new(
        product_id: impl Into<ProductId>,
        color_id: impl Into<ColorId>,
        finish_id: impl Into<FinishId>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            color_id: color_id.into(),
            finish_id: finish_id.into(),
        }
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.product_id, self.color_id, self.finish_id)
    }
}

/// One product + color + finish + quantity + price combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub color_id: ColorId,
    pub finish_id: FinishId,
    pub product_name: String,
    pub color_name: String,
    pub finish_name: String,
    pub quantity: u32,
    /// Catalog price of a single unit, before volume tiers.
    pub list_price: Decimal,
    /// Price of a single unit.
    pub unit_price: Decimal,
    /// Priced with trade volume tiers.
    #[serde(default)]
    pub trade: bool,
}

impl CartItem {
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            color_id: self.color_id.clone(),
            finish_id: self.finish_id.clone(),
        }
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id
            && self.color_id == key.color_id
            && self.finish_id == key.finish_id
    }

    /// Switch the line to trade volume pricing for its current quantity.
    pub fn apply_trade_pricing(&mut self) {
        self.trade = true;
        self.reprice();
    }

    fn reprice(&mut self) {
        self.unit_price = if self.trade {
            trade_unit_price(self.list_price, self.quantity)
        } else {
            self.list_price
        };
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.matches(key))
    }

    /// Add an item, merging quantities with an existing line for the same key.
    ///
    /// When merging, the existing line keeps its list price. The merged line is
    /// trade-priced if either side was, at the tier for the combined quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is zero, the price is negative, or the
    /// merged quantity would exceed [`MAX_LINE_QUANTITY`].
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        self.check_addition(&item)?;

        if let Some(existing) = self.items.iter_mut().find(|i| i.matches(&item.key())) {
            existing.quantity += item.quantity;
            existing.trade |= item.trade;
            existing.reprice();
        } else {
            self.items.push(item);
        }
        Ok(())
    }

    /// Add several items at once. Either all are added or none are.
    ///
    /// # Errors
    ///
    /// Returns the first error any item would raise; the cart is unchanged.
    pub fn add_items(&mut self, items: Vec<CartItem>) -> Result<(), CartError> {
        let mut staged = self.clone();
        for item in items {
            staged.add_item(item)?;
        }
        *self = staged;
        Ok(())
    }

    /// Replace the quantity stored for a line. Missing lines are ignored.
    ///
    /// Trade lines are repriced at the tier for the new quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for zero; callers must use
    /// [`Cart::remove_item`] instead.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::QuantityTooLarge(key.clone()));
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.matches(key)) {
            item.quantity = quantity;
            item.reprice();
        }
        Ok(())
    }

    /// Remove a line. Returns whether a line was removed.
    pub fn remove_item(&mut self, key: &LineKey) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !item.matches(key));
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `unit_price × quantity` across all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    fn check_addition(&self, item: &CartItem) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let lowest = item.unit_price.min(item.list_price);
        if lowest.is_sign_negative() && !lowest.is_zero() {
            return Err(CartError::InvalidPrice(lowest));
        }

        let existing = self.get(&item.key()).map_or(0, |i| i.quantity);
        match existing.checked_add(item.quantity) {
            Some(total) if total <= MAX_LINE_QUANTITY => Ok(()),
            _ => Err(CartError::QuantityTooLarge(item.key())),
        }
    }
}
