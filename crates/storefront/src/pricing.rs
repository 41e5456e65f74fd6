//! Order pricing: subtotal → promo discount → shipping → tax → total.
//!
//! Every function here is pure and synchronous. Amounts are exact decimals
//! and are not rounded; rounding to cents happens when an amount is displayed.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use paintshop_core::Money;

use crate::cart::{Cart, CartItem};
use crate::catalog::{PromoCode, PromoKind, ShippingOption};

/// Flat sales tax rate applied to the discounted subtotal.
pub const DEFAULT_TAX_RATE: Decimal = dec!(0.08);

/// Sum of line totals.
#[must_use]
pub fn calculate_subtotal(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

/// Discount granted by a promo code.
///
/// Percentage codes take `discount`% of the subtotal; fixed codes take the
/// flat `discount` regardless of the subtotal. Minimum-subtotal gates are
/// checked by [`PromoCode::is_applicable`], not here.
#[must_use]
pub fn calculate_discount(subtotal: Decimal, promo: Option<&PromoCode>) -> Decimal {
    match promo {
        None => Decimal::ZERO,
        Some(promo) => match promo.kind {
            PromoKind::Percentage => subtotal * (promo.discount / dec!(100)),
            PromoKind::Fixed => promo.discount,
            PromoKind::FreeShipping => Decimal::ZERO,
        },
    }
}

/// Shipping charge: the option's flat price, or zero under a free-shipping code.
#[must_use]
pub fn calculate_shipping(
    _subtotal: Decimal,
    shipping_option: Option<&ShippingOption>,
    promo: Option<&PromoCode>,
) -> Decimal {
    if promo.is_some_and(PromoCode::is_free_shipping) {
        return Decimal::ZERO;
    }
    shipping_option.map_or(Decimal::ZERO, |option| option.price)
}

/// Tax on the discounted amount. A negative base is taxed as zero.
#[must_use]
pub fn calculate_tax(amount_after_discount: Decimal, tax_rate: Decimal) -> Decimal {
    amount_after_discount.max(Decimal::ZERO) * tax_rate
}

/// `subtotal + shipping + tax − discount`.
///
/// Not clamped: a discount larger than everything else yields a negative total.
#[must_use]
pub fn calculate_total(
    subtotal: Decimal,
    shipping: Decimal,
    tax: Decimal,
    discount: Decimal,
) -> Decimal {
    subtotal + shipping + tax - discount
}

/// Trade volume tiers as `(minimum units, percent off)`, largest first.
///
/// | units on the line | discount |
/// |---|---|
/// | 10+ | 5% |
/// | 25+ | 10% |
/// | 50+ | 15% |
const TRADE_TIERS: &[(u32, Decimal)] = &[(50, dec!(15)), (25, dec!(10)), (10, dec!(5))];

/// Percent off the unit price for a trade line of `quantity` units.
#[must_use]
pub fn tier_discount_percent(quantity: u32) -> Decimal {
    TRADE_TIERS
        .iter()
        .find(|(minimum, _)| quantity >= *minimum)
        .map_or(Decimal::ZERO, |(_, percent)| *percent)
}

/// Unit price after the volume tier for `quantity` is applied.
#[must_use]
pub fn trade_unit_price(list_price: Decimal, quantity: u32) -> Decimal {
    list_price * (Decimal::ONE_HUNDRED - tier_discount_percent(quantity)) / Decimal::ONE_HUNDRED
}

/// The derived numbers shown in the order summary panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub item_count: u64,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    /// Code that contributed to `discount`/`shipping`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_promo: Option<String>,
    /// Code that was selected but no longer applies to this subtotal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_promo: Option<String>,
}

impl OrderSummary {
    /// Derive the summary from the cart and the checkout selections.
    ///
    /// The promo's validity is re-checked against the current subtotal, so a
    /// minimum-spend code that stops qualifying after the cart shrinks is
    /// reported in `rejected_promo` and contributes nothing.
    #[must_use]
    pub fn derive(
        cart: &Cart,
        shipping_option: Option<&ShippingOption>,
        promo: Option<&PromoCode>,
        tax_rate: Decimal,
    ) -> Self {
        let subtotal = calculate_subtotal(cart.items());
        let (applied, rejected) = match promo {
            Some(promo) if promo.is_applicable(subtotal) => (Some(promo), None),
            Some(promo) => (None, Some(promo.code.clone())),
            None => (None, None),
        };

        let discount = calculate_discount(subtotal, applied);
        let shipping = calculate_shipping(subtotal, shipping_option, applied);
        let tax = calculate_tax(subtotal - discount, tax_rate);
        let total = calculate_total(subtotal, shipping, tax, discount);

        Self {
            item_count: cart.total_items(),
            subtotal,
            discount,
            shipping,
            tax,
            total,
            applied_promo: applied.map(|p| p.code.clone()),
            rejected_promo: rejected,
        }
    }

    /// Labelled amounts in display order, for rendering.
    #[must_use]
    pub fn lines(&self) -> Vec<(&'static str, Money)> {
        let mut lines = vec![("Subtotal", Money::usd(self.subtotal))];
        if !self.discount.is_zero() {
            lines.push(("Discount", -Money::usd(self.discount)));
        }
        lines.push(("Shipping", Money::usd(self.shipping)));
        lines.push(("Tax", Money::usd(self.tax)));
        lines.push(("Total", Money::usd(self.total)));
        lines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::cart::tests::item;
    use crate::catalog::Catalog;

    fn promo(code: &str) -> PromoCode {
        Catalog::reference().promo(code).unwrap().clone()
    }

    fn standard() -> ShippingOption {
        Catalog::reference().shipping_options[0].clone()
    }

    #[test]
    fn test_no_promo_no_discount() {
        assert_eq!(calculate_discount(dec!(100), None), Decimal::ZERO);
    }

    #[test]
    fn test_fixed_discount_ignores_subtotal() {
        let save25 = promo("SAVE25");
        assert_eq!(calculate_discount(dec!(10), Some(&save25)), dec!(25));
        assert_eq!(calculate_discount(dec!(500), Some(&save25)), dec!(25));
    }

    #[test]
    fn test_free_shipping_promo() {
        let freeship = promo("FREESHIP");
        assert_eq!(
            calculate_shipping(dec!(50), Some(&standard()), Some(&freeship)),
            Decimal::ZERO
        );
        assert_eq!(calculate_discount(dec!(50), Some(&freeship)), Decimal::ZERO);
        assert_eq!(
            calculate_shipping(dec!(50), Some(&standard()), Some(&promo("SAVE10"))),
            dec!(9.99)
        );
    }

    #[test]
    fn test_shipping_without_selection_is_zero() {
        assert_eq!(calculate_shipping(dec!(50), None, None), Decimal::ZERO);
    }

    #[test]
    fn test_negative_tax_base_is_not_taxed() {
        assert_eq!(calculate_tax(dec!(-5), DEFAULT_TAX_RATE), Decimal::ZERO);
    }

    #[test]
    fn test_save10_scenario() {
        let mut cart = Cart::new();
        cart.add_item(item("cabinet-enamel", "white", "satin", 2, dec!(89.99))).unwrap();
        let save10 = promo("SAVE10");

        let summary =
            OrderSummary::derive(&cart, Some(&standard()), Some(&save10), DEFAULT_TAX_RATE);

        assert_eq!(summary.subtotal, dec!(179.98));
        assert_eq!(summary.discount, dec!(17.998));
        assert_eq!(summary.shipping, dec!(9.99));
        assert_eq!(summary.tax, dec!(161.982) * DEFAULT_TAX_RATE);
        assert_eq!(
            summary.total,
            dec!(179.98) + dec!(9.99) + dec!(12.95856) - dec!(17.998)
        );
        assert_eq!(summary.applied_promo.as_deref(), Some("SAVE10"));
    }

    #[test]
    fn test_minimum_spend_promo_rejected_below_threshold() {
        let mut cart = Cart::new();
        cart.add_item(item("signature-interior", "charcoal", "flat", 1, dec!(84.99))).unwrap();

        let summary =
            OrderSummary::derive(&cart, None, Some(&promo("SAVE25")), DEFAULT_TAX_RATE);

        assert_eq!(summary.discount, Decimal::ZERO);
        assert_eq!(summary.applied_promo, None);
        assert_eq!(summary.rejected_promo.as_deref(), Some("SAVE25"));
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_discount_percent(9), Decimal::ZERO);
        assert_eq!(tier_discount_percent(10), dec!(5));
        assert_eq!(tier_discount_percent(24), dec!(5));
        assert_eq!(tier_discount_percent(25), dec!(10));
        assert_eq!(tier_discount_percent(50), dec!(15));
        assert_eq!(tier_discount_percent(5000), dec!(15));
    }

    #[test]
    fn test_trade_unit_price() {
        assert_eq!(trade_unit_price(dec!(100), 1), dec!(100));
        assert_eq!(trade_unit_price(dec!(100), 10), dec!(95));
        assert_eq!(trade_unit_price(dec!(32.99), 50), dec!(28.0415));
    }

    #[test]
    fn test_discount_larger_than_subtotal_goes_negative() {
        let total = calculate_total(dec!(10), Decimal::ZERO, Decimal::ZERO, dec!(25));
        assert_eq!(total, dec!(-15));
    }

    #[test]
    fn test_summary_lines_show_discount_as_negative() {
        let mut cart = Cart::new();
        cart.add_item(item("cabinet-enamel", "white", "satin", 2, dec!(89.99))).unwrap();
        let summary = OrderSummary::derive(&cart, None, Some(&promo("SAVE10")), DEFAULT_TAX_RATE);

        let lines = summary.lines();
        assert_eq!(lines[1].0, "Discount");
        assert_eq!(lines[1].1.display(), "-$18.00");
        assert_eq!(lines.last().unwrap().0, "Total");
    }

    fn cents() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000).prop_map(|c| Decimal::new(c, 2))
    }

    proptest! {
        #[test]
        fn percentage_discount_is_proportional(subtotal in cents(), pct in 0u32..=100) {
            let promo = PromoCode {
                code: "PCT".to_string(),
                discount: Decimal::from(pct),
                kind: PromoKind::Percentage,
                description: String::new(),
                minimum_subtotal: None,
            };
            prop_assert_eq!(
                calculate_discount(subtotal, Some(&promo)),
                subtotal * Decimal::from(pct) / dec!(100)
            );
        }

        #[test]
        fn total_is_literal_sum(s in cents(), sh in cents(), t in cents(), d in cents()) {
            prop_assert_eq!(calculate_total(s, sh, t, d), s + sh + t - d);
        }

        #[test]
        fn merging_lines_adds_quantities(q1 in 1u32..500, q2 in 1u32..500) {
            let mut cart = Cart::new();
            cart.add_item(item("p", "c", "f", q1, dec!(1))).unwrap();
            cart.add_item(item("p", "c", "f", q2, dec!(1))).unwrap();
            prop_assert_eq!(cart.items().len(), 1);
            prop_assert_eq!(cart.items()[0].quantity, q1 + q2);
        }
    }
}
