//! Order placement.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::backend::{MockBackend, OrderRequest};
use crate::cart::Cart;
use crate::checkout::{CheckoutError, CheckoutStep, CheckoutStore, OrderConfirmation};
use crate::error::{AppError, add_breadcrumb};
use crate::pricing::OrderSummary;

/// Place the order for the current cart and checkout state.
///
/// Preconditions are checked before the backend is called: the order must not
/// already be placed, the cart must be non-empty, every required form field
/// must be present, and the total must not be negative.
///
/// On success the confirmation is stored in `checkout`, the cart is cleared,
/// and the wizard moves to Confirmation. On failure neither `cart` nor
/// `checkout` is modified, so the user can retry.
///
/// # Errors
///
/// Returns `AppError::Checkout` for unmet preconditions and
/// `AppError::Backend` when submission fails.
#[instrument(skip_all, fields(items = cart.items().len(), step = %checkout.step()))]
pub async fn place_order(
    cart: &mut Cart,
    checkout: &mut CheckoutStore,
    backend: &MockBackend,
    tax_rate: Decimal,
) -> Result<OrderConfirmation, AppError> {
    let request = prepare_order(cart, checkout, tax_rate)?;

    let total = request.summary.total.to_string();
    add_breadcrumb("checkout", "Submitting order", Some(&[("total", total.as_str())]));
    let confirmation = backend.submit_order(request).await?;

    checkout.set_order_data(confirmation.clone())?;
    cart.clear();
    checkout.go_to_step(CheckoutStep::Confirmation)?;

    info!(order_id = %confirmation.order_id, "Checkout complete");
    Ok(confirmation)
}

/// Build the backend request, or report the first unmet precondition.
fn prepare_order(
    cart: &Cart,
    checkout: &CheckoutStore,
    tax_rate: Decimal,
) -> Result<OrderRequest, CheckoutError> {
    if checkout.is_complete() {
        return Err(CheckoutError::AlreadyPlaced);
    }
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let form = checkout.form();
    let (Some(shipping_address), Some(shipping_option), Some(payment_method), Some(billing)) = (
        form.shipping_address.as_ref(),
        form.shipping_option.as_ref(),
        form.payment_method.as_ref(),
        form.effective_billing_address(),
    ) else {
        return Err(CheckoutError::MissingField(
            form.first_missing().unwrap_or("checkout details"),
        ));
    };

    let summary = OrderSummary::derive(
        cart,
        Some(shipping_option),
        form.promo_code.as_ref(),
        tax_rate,
    );
    if summary.total < Decimal::ZERO {
        return Err(CheckoutError::NegativeTotal(summary.total));
    }

    Ok(OrderRequest {
        items: cart.items().to_vec(),
        shipping_address: shipping_address.clone(),
        billing_address: billing.clone(),
        shipping_option: shipping_option.clone(),
        payment_method: payment_method.clone(),
        promo_code: summary.applied_promo.clone(),
        summary,
    })
}
