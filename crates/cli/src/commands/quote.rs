//! Price quotes from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Two gallons of cabinet enamel, standard shipping, 10% off
//! paintshop quote -l cabinet-enamel,white,satin,2 -s standard -p SAVE10
//!
//! # Trade pricing for a bulk order
//! paintshop quote --trade -l bond-primer,white,flat,60 -l signature-interior,sage-leaf,eggshell,30
//! ```
//!
//! # Environment Variables
//!
//! - `PAINTSHOP_TAX_RATE` - Sales tax rate (default: 0.08)

use rust_decimal::Decimal;
use thiserror::Error;

use paintshop_core::{Money, ShippingOptionId};
use paintshop_storefront::cart::{Cart, CartError};
use paintshop_storefront::catalog::{Catalog, CatalogError};
use paintshop_storefront::pricing::OrderSummary;
use paintshop_storefront::services::trade;
use paintshop_storefront::validation::{BulkOrderForm, ValidationErrors};

/// Errors that can occur while building a quote.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Unknown promo code: {0}")]
    UnknownPromo(String),

    #[error("Tax rate must be at least 0 and below 1 (got {0})")]
    InvalidTaxRate(Decimal),
}

/// What to quote.
#[derive(Debug, Clone, Default)]
pub struct QuoteRequest {
    /// `product,color,finish,quantity` lines.
    pub lines: Vec<String>,
    pub shipping: Option<String>,
    pub promo: Option<String>,
    /// Apply trade volume tiers.
    pub trade: bool,
}

/// A priced cart and its summary.
#[derive(Debug, Clone)]
pub struct Quote {
    pub cart: Cart,
    pub summary: OrderSummary,
}

/// Build a quote against the catalog.
///
/// # Errors
///
/// Returns an error for malformed lines, anything the catalog does not offer,
/// an unknown promo code, or a tax rate outside `[0, 1)`.
pub fn build(
    catalog: &Catalog,
    request: &QuoteRequest,
    tax_rate: Decimal,
) -> Result<Quote, QuoteError> {
    if tax_rate.is_sign_negative() || tax_rate >= Decimal::ONE {
        return Err(QuoteError::InvalidTaxRate(tax_rate));
    }

    let form = BulkOrderForm {
        lines: request.lines.join("\n"),
    };
    let lines = form.validate()?;

    let items = if request.trade {
        trade::resolve_lines(catalog, &lines)?
    } else {
        lines
            .iter()
            .map(|line| {
                catalog
                    .product(&line.key.product_id)
                    .ok_or_else(|| CatalogError::UnknownProduct(line.key.product_id.clone()))?
                    .line_item(&line.key.color_id, &line.key.finish_id, line.quantity)
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut cart = Cart::new();
    cart.add_items(items)?;

    let shipping = request
        .shipping
        .as_deref()
        .map(|id| {
            let id = ShippingOptionId::new(id);
            catalog
                .shipping_option(&id)
                .ok_or(CatalogError::UnknownShippingOption(id))
        })
        .transpose()?;
    let promo = request
        .promo
        .as_deref()
        .map(|code| {
            catalog
                .promo(code)
                .ok_or_else(|| QuoteError::UnknownPromo(code.to_string()))
        })
        .transpose()?;

    let summary = OrderSummary::derive(&cart, shipping, promo, tax_rate);
    Ok(Quote { cart, summary })
}

/// Print a quote as a receipt, or as JSON.
#[allow(clippy::print_stdout)]
pub fn print(quote: &Quote, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(&quote.summary)?);
        return Ok(());
    }

    for item in quote.cart.items() {
        println!(
            "{:>4} x {} {} {} @ {}",
            item.quantity,
            item.product_name,
            item.color_name,
            item.finish_name,
            Money::usd(item.unit_price).display()
        );
    }
    println!();
    for (label, amount) in quote.summary.lines() {
        println!("{label:<10} {:>12}", amount.display());
    }
    if let Some(code) = &quote.summary.rejected_promo {
        println!();
        println!("Promo {code} does not apply to this subtotal.");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn request(lines: &[&str]) -> QuoteRequest {
        QuoteRequest {
            lines: lines.iter().map(|l| (*l).to_string()).collect(),
            ..QuoteRequest::default()
        }
    }

    #[test]
    fn test_retail_quote() {
        let mut req = request(&["cabinet-enamel,white,satin,2"]);
        req.shipping = Some("standard".to_string());
        req.promo = Some("save10".to_string());

        let quote = build(&Catalog::reference(), &req, dec!(0.08)).unwrap();
        assert_eq!(quote.summary.subtotal, dec!(179.98));
        assert_eq!(quote.summary.shipping, dec!(9.99));
        assert_eq!(quote.summary.applied_promo.as_deref(), Some("SAVE10"));
    }

    #[test]
    fn test_trade_quote_applies_tiers() {
        let mut req = request(&["bond-primer,white,flat,50"]);
        req.trade = true;

        let quote = build(&Catalog::reference(), &req, dec!(0.08)).unwrap();
        assert_eq!(quote.cart.items()[0].unit_price, dec!(28.0415));
    }

    #[test]
    fn test_unknown_inputs() {
        let catalog = Catalog::reference();
        assert!(matches!(
            build(&catalog, &request(&["gold-leaf,white,flat,1"]), dec!(0.08)),
            Err(QuoteError::Catalog(CatalogError::UnknownProduct(_)))
        ));

        let mut req = request(&["bond-primer,white,flat,1"]);
        req.shipping = Some("teleport".to_string());
        assert!(matches!(
            build(&catalog, &req, dec!(0.08)),
            Err(QuoteError::Catalog(CatalogError::UnknownShippingOption(_)))
        ));

        let mut req = request(&["bond-primer,white,flat,1"]);
        req.promo = Some("BOGUS".to_string());
        assert!(matches!(
            build(&catalog, &req, dec!(0.08)),
            Err(QuoteError::UnknownPromo(_))
        ));

        assert!(matches!(
            build(&catalog, &request(&[]), dec!(0.08)),
            Err(QuoteError::Validation(_))
        ));
    }

    #[test]
    fn test_tax_rate_out_of_range() {
        let catalog = Catalog::reference();
        let req = request(&["bond-primer,white,flat,1"]);

        for rate in [dec!(-0.01), dec!(1), dec!(8)] {
            assert!(matches!(
                build(&catalog, &req, rate),
                Err(QuoteError::InvalidTaxRate(r)) if r == rate
            ));
        }
        let quote = build(&catalog, &req, Decimal::ZERO).unwrap();
        assert_eq!(quote.summary.tax, Decimal::ZERO);
    }
}
