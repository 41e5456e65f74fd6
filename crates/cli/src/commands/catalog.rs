//! Reference data listings.
//!
//! # Usage
//!
//! ```bash
//! paintshop catalog
//! paintshop shipping
//! paintshop promos
//! ```

use paintshop_core::Money;
use paintshop_storefront::catalog::{Catalog, PromoKind};

/// List products with their colors and per-finish prices.
#[allow(clippy::print_stdout)]
pub fn products(catalog: &Catalog) {
    for product in &catalog.products {
        println!("{} ({})", product.name, product.id);
        println!("  {}", product.description);

        let colors: Vec<&str> = product.colors.iter().map(|c| c.id.as_str()).collect();
        println!("  colors: {}", colors.join(", "));

        for finish in &product.finishes {
            let price = product.base_price + finish.price_adjustment;
            println!(
                "  {:<12} {:>10} / gal",
                finish.id.as_str(),
                Money::usd(price).display()
            );
        }
        println!();
    }
}

/// List shipping options.
#[allow(clippy::print_stdout)]
pub fn shipping(catalog: &Catalog) {
    for option in &catalog.shipping_options {
        let (min, max) = option.estimated_days;
        println!(
            "{:<10} {:>8}  {} ({min}-{max} days)",
            option.id.as_str(),
            Money::usd(option.price).display(),
            option.name,
        );
    }
}

/// List promo codes.
#[allow(clippy::print_stdout)]
pub fn promos(catalog: &Catalog) {
    for promo in &catalog.promo_codes {
        let value = match promo.kind {
            PromoKind::Percentage => format!("{}% off", promo.discount),
            PromoKind::Fixed => format!("{} off", Money::usd(promo.discount).display()),
            PromoKind::FreeShipping => "free shipping".to_string(),
        };
        let minimum = promo
            .minimum_subtotal
            .map(|m| format!(" (min {})", Money::usd(m).display()))
            .unwrap_or_default();
        println!("{:<10} {value}{minimum}  {}", promo.code, promo.description);
    }
}
