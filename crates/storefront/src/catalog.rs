//! Catalog reference data: paints, shipping options and promo codes.
//!
//! This is static data. Users select from it by reference; nothing here is
//! mutated at runtime.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use paintshop_core::{ColorId, FinishId, ProductId, ShippingOptionId};

use crate::cart::CartItem;

/// Errors resolving a product/color/finish combination against the catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),
    #[error("color {color} is not offered for {product}")]
    UnknownColor { product: ProductId, color: ColorId },
    #[error("finish {finish} is not offered for {product}")]
    UnknownFinish {
        product: ProductId,
        finish: FinishId,
    },
    #[error("unknown shipping option: {0}")]
    UnknownShippingOption(ShippingOptionId),
}

/// Paint product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    /// Price per gallon before the finish adjustment.
    pub base_price: Decimal,
    pub colors: Vec<Color>,
    pub finishes: Vec<Finish>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Interior,
    Exterior,
    Primer,
    Specialty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: ColorId,
    pub name: String,
    /// `#RRGGBB` swatch.
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finish {
    pub id: FinishId,
    pub name: String,
    /// Added to the product's base price.
    pub price_adjustment: Decimal,
}

impl Product {
    /// Build a cart line for this product in the given color and finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the color or finish is not offered for this product.
    pub fn line_item(
        &self,
        color_id: &ColorId,
        finish_id: &FinishId,
        quantity: u32,
    ) -> Result<CartItem, CatalogError> {
        let color = self
            .colors
            .iter()
            .find(|c| &c.id == color_id)
            .ok_or_else(|| CatalogError::UnknownColor {
                product: self.id.clone(),
                color: color_id.clone(),
            })?;
        let finish = self.finish(finish_id)?;
        let list_price = self.base_price + finish.price_adjustment;

        Ok(CartItem {
            product_id: self.id.clone(),
            color_id: color.id.clone(),
            finish_id: finish.id.clone(),
            product_name: self.name.clone(),
            color_name: color.name.clone(),
            finish_name: finish.name.clone(),
            quantity,
            list_price,
            unit_price: list_price,
            trade: false,
        })
    }

    fn finish(&self, finish_id: &FinishId) -> Result<&Finish, CatalogError> {
        self.finishes
            .iter()
            .find(|f| &f.id == finish_id)
            .ok_or_else(|| CatalogError::UnknownFinish {
                product: self.id.clone(),
                finish: finish_id.clone(),
            })
    }
}

/// A delivery method the customer can pick at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
    pub id: ShippingOptionId,
    pub name: String,
    pub description: String,
    /// Flat price, independent of weight or volume.
    pub price: Decimal,
    /// Business days, as `(min, max)`.
    pub estimated_days: (u32, u32),
}

/// How a promo code discounts an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoKind {
    /// `discount` is a percentage of the subtotal.
    Percentage,
    /// `discount` is a flat amount.
    Fixed,
    /// Waives the shipping charge; `discount` is unused.
    FreeShipping,
}

/// A discount rule identified by a string code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCode {
    pub code: String,
    pub discount: Decimal,
    pub kind: PromoKind,
    pub description: String,
    /// The code only applies when the subtotal is at least this much.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_subtotal: Option<Decimal>,
}

impl PromoCode {
    /// Whether the code can be applied to an order with this subtotal.
    #[must_use]
    pub fn is_applicable(&self, subtotal: Decimal) -> bool {
        self.minimum_subtotal.is_none_or(|minimum| subtotal >= minimum)
    }

    /// Whether this code waives shipping.
    #[must_use]
    pub fn is_free_shipping(&self) -> bool {
        self.kind == PromoKind::FreeShipping
    }
}

/// Normalize user-entered promo code text for lookup.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// The full set of reference data served by the mock backend.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub products: Vec<Product>,
    pub shipping_options: Vec<ShippingOption>,
    pub promo_codes: Vec<PromoCode>,
}

impl Catalog {
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn shipping_option(&self, id: &ShippingOptionId) -> Option<&ShippingOption> {
        self.shipping_options.iter().find(|o| &o.id == id)
    }

    /// Case-insensitive promo lookup.
    #[must_use]
    pub fn promo(&self, code: &str) -> Option<&PromoCode> {
        let code = normalize_code(code);
        self.promo_codes.iter().find(|p| p.code == code)
    }

    /// The store's standard paint lineup.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            products: reference_products(),
            shipping_options: reference_shipping_options(),
            promo_codes: reference_promo_codes(),
        }
    }
}

fn color(id: &str, name: &str, hex: &str) -> Color {
    Color {
        id: ColorId::new(id),
        name: name.to_string(),
        hex: hex.to_string(),
    }
}

fn finish(id: &str, name: &str, price_adjustment: Decimal) -> Finish {
    Finish {
        id: FinishId::new(id),
        name: name.to_string(),
        price_adjustment,
    }
}

fn reference_products() -> Vec<Product> {
    let interior_colors = vec![
        color("swiss-coffee", "Swiss Coffee", "#EDE6D6"),
        color("harbor-blue", "Harbor Blue", "#4A6B82"),
        color("sage-leaf", "Sage Leaf", "#9CAF88"),
        color("charcoal", "Charcoal", "#36454F"),
    ];
    let exterior_colors = vec![
        color("barn-red", "Barn Red", "#7C0A02"),
        color("cedar-shake", "Cedar Shake", "#8B5A2B"),
        color("stone-gray", "Stone Gray", "#928E85"),
    ];

    vec![
        Product {
            id: ProductId::new("signature-interior"),
            name: "Signature Interior".to_string(),
            description: "Scrubbable one-coat interior acrylic.".to_string(),
            category: ProductCategory::Interior,
            base_price: dec!(84.99),
            colors: interior_colors.clone(),
            finishes: vec![
                finish("flat", "Flat", dec!(0)),
                finish("eggshell", "Eggshell", dec!(5.00)),
                finish("satin", "Satin", dec!(7.00)),
            ],
        },
        Product {
            id: ProductId::new("everyday-interior"),
            name: "Everyday Interior".to_string(),
            description: "Budget-friendly paint for ceilings and closets.".to_string(),
            category: ProductCategory::Interior,
            base_price: dec!(39.99),
            colors: interior_colors,
            finishes: vec![
                finish("flat", "Flat", dec!(0)),
                finish("eggshell", "Eggshell", dec!(3.00)),
            ],
        },
        Product {
            id: ProductId::new("weatherguard-exterior"),
            name: "WeatherGuard Exterior".to_string(),
            description: "UV- and mildew-resistant exterior coating.".to_string(),
            category: ProductCategory::Exterior,
            base_price: dec!(94.99),
            colors: exterior_colors,
            finishes: vec![
                finish("flat", "Flat", dec!(0)),
                finish("satin", "Satin", dec!(6.00)),
                finish("semi-gloss", "Semi-Gloss", dec!(9.00)),
            ],
        },
        Product {
            id: ProductId::new("bond-primer"),
            name: "Bond Primer".to_string(),
            description: "Stain-blocking primer for glossy surfaces.".to_string(),
            category: ProductCategory::Primer,
            base_price: dec!(32.99),
            colors: vec![color("white", "White", "#FFFFFF")],
            finishes: vec![finish("flat", "Flat", dec!(0))],
        },
        Product {
            id: ProductId::new("cabinet-enamel"),
            name: "Cabinet & Trim Enamel".to_string(),
            description: "Self-leveling urethane alkyd enamel.".to_string(),
            category: ProductCategory::Specialty,
            base_price: dec!(89.99),
            colors: vec![
                color("white", "White", "#FFFFFF"),
                color("charcoal", "Charcoal", "#36454F"),
            ],
            finishes: vec![
                finish("satin", "Satin", dec!(0)),
                finish("semi-gloss", "Semi-Gloss", dec!(0)),
            ],
        },
    ]
}

fn reference_shipping_options() -> Vec<ShippingOption> {
    vec![
        ShippingOption {
            id: ShippingOptionId::new("standard"),
            name: "Standard Shipping".to_string(),
            description: "Ground delivery".to_string(),
            price: dec!(9.99),
            estimated_days: (5, 7),
        },
        ShippingOption {
            id: ShippingOptionId::new("express"),
            name: "Express Shipping".to_string(),
            description: "Two-day air".to_string(),
            price: dec!(19.99),
            estimated_days: (2, 3),
        },
        ShippingOption {
            id: ShippingOptionId::new("overnight"),
            name: "Overnight".to_string(),
            description: "Next business day".to_string(),
            price: dec!(34.99),
            estimated_days: (1, 1),
        },
        ShippingOption {
            id: ShippingOptionId::new("pickup"),
            name: "In-Store Pickup".to_string(),
            description: "Ready at your local store".to_string(),
            price: Decimal::ZERO,
            estimated_days: (0, 1),
        },
    ]
}

fn reference_promo_codes() -> Vec<PromoCode> {
    vec![
        PromoCode {
            code: "SAVE10".to_string(),
            discount: dec!(10),
            kind: PromoKind::Percentage,
            description: "10% off your order".to_string(),
            minimum_subtotal: None,
        },
        PromoCode {
            code: "WELCOME15".to_string(),
            discount: dec!(15),
            kind: PromoKind::Percentage,
            description: "15% off your first order".to_string(),
            minimum_subtotal: None,
        },
        PromoCode {
            code: "SAVE25".to_string(),
            discount: dec!(25),
            kind: PromoKind::Fixed,
            description: "$25 off orders over $200".to_string(),
            minimum_subtotal: Some(dec!(200)),
        },
        PromoCode {
            code: "FREESHIP".to_string(),
            discount: Decimal::ZERO,
            kind: PromoKind::FreeShipping,
            description: "Free shipping on any order".to_string(),
            minimum_subtotal: None,
        },
    ]
}
