//! Trade (B2B) bulk ordering.
//!
//! Trade customers paste many lines at once. Lines are resolved against the
//! catalog, priced with volume tiers, and merged into the cart in a single
//! all-or-nothing step.
//!
//! Tiers are defined in [`crate::pricing::tier_discount_percent`].

use tracing::{info, instrument};

use crate::cart::{Cart, CartItem, LineKey};
use crate::catalog::Catalog;
use crate::error::AppError;
use crate::validation::{BulkLine, BulkOrderForm, ValidationErrors};

/// Combine lines that name the same product, color and finish.
fn merge_lines(lines: &[BulkLine]) -> Vec<BulkLine> {
    let mut merged: Vec<BulkLine> = Vec::with_capacity(lines.len());
    for line in lines {
        if let Some(existing) = merged.iter_mut().find(|l| l.key == line.key) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            merged.push(line.clone());
        }
    }
    merged
}

/// Resolve parsed lines to priced cart items.
///
/// # Errors
///
/// Returns one `lines` error per line the catalog does not offer.
pub fn resolve_lines(
    catalog: &Catalog,
    lines: &[BulkLine],
) -> Result<Vec<CartItem>, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let mut items = Vec::new();

    for line in merge_lines(lines) {
        let LineKey {
            product_id,
            color_id,
            finish_id,
        } = &line.key;

        let resolved = catalog
            .product(product_id)
            .ok_or_else(|| format!("unknown product {product_id}"))
            .and_then(|product| {
                product
                    .line_item(color_id, finish_id, line.quantity)
                    .map_err(|e| e.to_string())
            });

        match resolved {
            Ok(mut item) => {
                item.apply_trade_pricing();
                items.push(item);
            }
            Err(message) => errors.add("lines", message),
        }
    }

    if errors.is_empty() {
        Ok(items)
    } else {
        Err(errors)
    }
}

/// Parse, resolve and add a bulk order to the cart.
///
/// Returns the number of lines added. Lines already in the cart have their
/// quantity increased and become trade-priced at the tier for the new total.
///
/// # Errors
///
/// Returns `AppError::Validation` for unparseable or unknown lines and
/// `AppError::Cart` if a merged quantity exceeds the per-line limit. The cart
/// is unchanged on any error.
#[instrument(skip_all)]
pub fn add_bulk_order(
    cart: &mut Cart,
    catalog: &Catalog,
    form: &BulkOrderForm,
) -> Result<usize, AppError> {
    let lines = form.validate()?;
    let items = resolve_lines(catalog, &lines)?;
    let count = items.len();

    cart.add_items(items)?;
    info!(lines = count, "Bulk order added to cart");
    Ok(count)
}
