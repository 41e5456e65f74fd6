//! Checkout wizard route handlers.
//!
//! Each step's form posts here. Forms are validated before anything is
//! stored; the wizard itself only moves when the client asks it to.

use axum::{Json, extract::State};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument};

use paintshop_core::{Money, ShippingOptionId};

use crate::cart::Cart;
use crate::catalog::CatalogError;
use crate::checkout::{
    CheckoutError, CheckoutFormData, CheckoutStep, CheckoutStore, OrderConfirmation,
};
use crate::error::{AppError, Result};
use crate::models::session;
use crate::pricing::OrderSummary;
use crate::services;
use crate::state::AppState;
use crate::validation::{AddressForm, PaymentForm};

/// One labelled amount of the order summary panel.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryLine {
    pub label: &'static str,
    pub amount: Decimal,
    pub display: String,
}

/// Checkout display data.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub step_number: u8,
    pub step_title: &'static str,
    pub form: CheckoutFormData,
    pub summary: OrderSummary,
    pub summary_lines: Vec<SummaryLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderConfirmation>,
}

impl CheckoutView {
    fn new(checkout: &CheckoutStore, cart: &Cart, tax_rate: Decimal) -> Self {
        // After placement the cart is empty; show what was ordered.
        let summary = checkout.order().map_or_else(
            || {
                OrderSummary::derive(
                    cart,
                    checkout.form().shipping_option.as_ref(),
                    checkout.form().promo_code.as_ref(),
                    tax_rate,
                )
            },
            |order| order.summary.clone(),
        );
        let summary_lines = summary
            .lines()
            .into_iter()
            .map(|(label, money): (&'static str, Money)| SummaryLine {
                label,
                amount: money.amount,
                display: money.display(),
            })
            .collect();

        Self {
            step: checkout.step(),
            step_number: checkout.step().number(),
            step_title: checkout.step().title(),
            form: checkout.form().clone(),
            summary,
            summary_lines,
            order: checkout.order().cloned(),
        }
    }
}

/// Shipping step request: the address plus an optional separate billing address.
#[derive(Debug, Deserialize)]
pub struct ShippingRequest {
    #[serde(flatten)]
    pub address: AddressForm,
    #[serde(default = "default_true")]
    pub same_as_shipping: bool,
    pub billing_address: Option<AddressForm>,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ShippingOptionRequest {
    pub shipping_option_id: ShippingOptionId,
}

#[derive(Debug, Deserialize)]
pub struct PromoRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct GoToStepRequest {
    pub step: u8,
}

/// Load the checkout, load the cart, apply `f`, store the checkout, respond.
async fn update_checkout(
    state: &AppState,
    session: &Session,
    f: impl FnOnce(&mut CheckoutStore) -> std::result::Result<(), AppError>,
) -> Result<Json<CheckoutView>> {
    let mut checkout = session::load_checkout(session).await?;
    f(&mut checkout)?;
    session::store_checkout(session, &checkout).await?;
    let cart = session::load_cart(session).await?;
    Ok(Json(CheckoutView::new(&checkout, &cart, state.config().tax_rate)))
}

/// Form fields cannot change once the order has been placed.
fn ensure_open(checkout: &CheckoutStore) -> std::result::Result<(), CheckoutError> {
    if checkout.is_complete() {
        Err(CheckoutError::AlreadyPlaced)
    } else {
        Ok(())
    }
}

/// Show the current step, the collected form data, and the order summary.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CheckoutView>> {
    let checkout = session::load_checkout(&session).await?;
    let cart = session::load_cart(&session).await?;
    Ok(Json(CheckoutView::new(&checkout, &cart, state.config().tax_rate)))
}

/// Submit the shipping address (and billing address when different).
#[instrument(skip_all)]
pub async fn shipping(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<ShippingRequest>,
) -> Result<Json<CheckoutView>> {
    ensure_open(&session::load_checkout(&session).await?)?;

    let same_as_shipping = request.same_as_shipping;
    let address = request.address.validate()?;
    let billing = if same_as_shipping {
        None
    } else {
        Some(request.billing_address.unwrap_or_default().validate()?)
    };
    let address = state.backend().validate_address(&address).await?;

    update_checkout(&state, &session, |checkout| {
        ensure_open(checkout)?;
        checkout.set_shipping_address(address, same_as_shipping);
        if let Some(billing) = billing {
            checkout.set_billing_address(billing);
        }
        Ok(())
    })
    .await
}

/// Choose a delivery method.
#[instrument(skip(state, session))]
pub async fn shipping_option(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<ShippingOptionRequest>,
) -> Result<Json<CheckoutView>> {
    let option = state
        .backend()
        .catalog()
        .shipping_option(&request.shipping_option_id)
        .cloned()
        .ok_or(CatalogError::UnknownShippingOption(request.shipping_option_id))?;

    update_checkout(&state, &session, |checkout| {
        ensure_open(checkout)?;
        checkout.set_shipping_option(option);
        Ok(())
    })
    .await
}

/// Submit the payment step.
#[instrument(skip_all)]
pub async fn payment(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<PaymentForm>,
) -> Result<Json<CheckoutView>> {
    let method = form.validate(Utc::now().date_naive())?;

    update_checkout(&state, &session, |checkout| {
        ensure_open(checkout)?;
        checkout.set_payment_method(method);
        Ok(())
    })
    .await
}

/// Apply a promo code to the current cart subtotal.
#[instrument(skip(state, session))]
pub async fn apply_promo(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<PromoRequest>,
) -> Result<Json<CheckoutView>> {
    let cart = session::load_cart(&session).await?;
    let promo = state
        .backend()
        .lookup_promo(&request.code, cart.total_price())
        .await?;
    info!(code = %promo.code, "Promo applied");

    update_checkout(&state, &session, |checkout| {
        ensure_open(checkout)?;
        checkout.set_promo_code(Some(promo));
        Ok(())
    })
    .await
}

#[instrument(skip(state, session))]
pub async fn remove_promo(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutView>> {
    update_checkout(&state, &session, |checkout| {
        ensure_open(checkout)?;
        checkout.set_promo_code(None);
        Ok(())
    })
    .await
}

/// Advance one step.
#[instrument(skip(state, session))]
pub async fn next(State(state): State<AppState>, session: Session) -> Result<Json<CheckoutView>> {
    update_checkout(&state, &session, |checkout| {
        checkout.next_step();
        Ok(())
    })
    .await
}

/// Go back one step.
#[instrument(skip(state, session))]
pub async fn back(State(state): State<AppState>, session: Session) -> Result<Json<CheckoutView>> {
    update_checkout(&state, &session, |checkout| {
        checkout.prev_step();
        Ok(())
    })
    .await
}

/// Jump to a step (e.g. "edit" links on the review step).
#[instrument(skip(state, session))]
pub async fn go_to_step(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<GoToStepRequest>,
) -> Result<Json<CheckoutView>> {
    let step = CheckoutStep::from_number(request.step)
        .ok_or_else(|| AppError::BadRequest(format!("no checkout step {}", request.step)))?;

    update_checkout(&state, &session, |checkout| {
        checkout.go_to_step(step)?;
        Ok(())
    })
    .await
}

/// Place the order. On failure the cart and checkout are left as they were.
#[instrument(skip(state, session))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let mut cart = session::load_cart(&session).await?;
    let mut checkout = session::load_checkout(&session).await?;

    let confirmation = services::checkout::place_order(
        &mut cart,
        &mut checkout,
        state.backend(),
        state.config().tax_rate,
    )
    .await?;

    session::store_cart(&session, &cart).await?;
    session::store_checkout(&session, &checkout).await?;
    session::record_order_id(&session, confirmation.order_id).await?;

    Ok(Json(CheckoutView::new(&checkout, &cart, state.config().tax_rate)))
}

/// Discard the wizard and start a new checkout.
#[instrument(skip(state, session))]
pub async fn reset(State(state): State<AppState>, session: Session) -> Result<Json<CheckoutView>> {
    update_checkout(&state, &session, |checkout| {
        checkout.reset();
        Ok(())
    })
    .await
}
