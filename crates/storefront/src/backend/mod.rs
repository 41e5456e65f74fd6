//! In-process mock of the store's backend API.
//!
//! # Behavior
//!
//! Every call sleeps for a random delay drawn from a [`LatencyProfile`], then
//! fails with the operation's configured probability. Failures are
//! [`BackendError::Unavailable`]; nothing retries automatically, so callers
//! surface the error and let the user try again.
//!
//! There are no timeouts and no cancellation. Dropping the returned future
//! discards the call.
//!
//! # Determinism
//!
//! Randomness comes from a [`StdRng`] owned by the backend. Seed it via
//! [`MockBackendConfig::seed`] to make latency and failures reproducible; set
//! failure rates to `0.0` or `1.0` to force a branch in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MockBackend::new(Catalog::reference(), MockBackendConfig::default());
//! let promo = backend.lookup_promo("SAVE10", cart.total_price()).await?;
//! let confirmation = backend.submit_order(request).await?;
//! ```

mod types;

pub use types::{OrderRequest, ReturnConfirmation, ReturnLine, ReturnRequest};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{Days, Utc};
use moka::future::Cache;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use paintshop_core::{OrderId, OrderStatus, ProductId, ReturnId, ReturnStatus};

use crate::cart::LineKey;
use crate::catalog::{Catalog, Product, PromoCode, ShippingOption};
use crate::checkout::{OrderConfirmation, ShippingAddress};

/// US state and territory codes accepted for delivery.
const US_STATES: &[&str] = &[
    "AK", "AL", "AR", "AZ", "CA", "CO", "CT", "DC", "DE", "FL", "GA", "HI", "IA", "ID", "IL",
    "IN", "KS", "KY", "LA", "MA", "MD", "ME", "MI", "MN", "MO", "MS", "MT", "NC", "ND", "NE",
    "NH", "NJ", "NM", "NV", "NY", "OH", "OK", "OR", "PA", "PR", "RI", "SC", "SD", "TN", "TX",
    "UT", "VA", "VT", "WA", "WI", "WV", "WY",
];

/// Errors returned by the backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Simulated outage. Safe to retry.
    #[error("{operation} is temporarily unavailable, please try again")]
    Unavailable { operation: &'static str },

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("promo code {0} is not valid")]
    PromoNotFound(String),

    #[error("promo code {code} requires a subtotal of at least ${minimum}")]
    PromoMinimumNotMet { code: String, minimum: Decimal },

    #[error("we cannot deliver to this address: {0}")]
    UndeliverableAddress(String),

    #[error("return cannot be accepted: {0}")]
    ReturnRejected(String),
}

impl BackendError {
    /// Whether the user should be offered a "try again" action.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Simulated network latency range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl LatencyProfile {
    /// No delay at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
        }
    }
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            min_ms: 200,
            max_ms: 800,
        }
    }
}

/// Probability in `[0, 1]` that each fallible operation fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailureRates {
    pub address_validation: f64,
    pub order_submission: f64,
    pub return_request: f64,
}

impl FailureRates {
    /// Never fail.
    #[must_use]
    pub const fn never() -> Self {
        Self {
            address_validation: 0.0,
            order_submission: 0.0,
            return_request: 0.0,
        }
    }

    /// Always fail.
    #[must_use]
    pub const fn always() -> Self {
        Self {
            address_validation: 1.0,
            order_submission: 1.0,
            return_request: 1.0,
        }
    }
}

impl Default for FailureRates {
    fn default() -> Self {
        Self {
            address_validation: 0.05,
            order_submission: 0.10,
            return_request: 0.05,
        }
    }
}

/// Mock backend configuration.
#[derive(Debug, Clone)]
pub struct MockBackendConfig {
    pub latency: LatencyProfile,
    pub failure_rates: FailureRates,
    /// Fixed RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Public storefront URL, used to build links in confirmations.
    pub base_url: String,
}

impl Default for MockBackendConfig {
    fn default() -> Self {
        Self {
            latency: LatencyProfile::default(),
            failure_rates: FailureRates::default(),
            seed: None,
            base_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

impl MockBackendConfig {
    /// Zero latency, no failures, fixed seed.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            latency: LatencyProfile::none(),
            failure_rates: FailureRates::never(),
            seed: Some(0),
            ..Self::default()
        }
    }
}

/// Mock backend client.
///
/// Cheaply cloneable; clones share the RNG, caches and recorded orders.
#[derive(Clone)]
pub struct MockBackend {
    inner: Arc<MockBackendInner>,
}

struct MockBackendInner {
    catalog: Catalog,
    config: MockBackendConfig,
    rng: Mutex<StdRng>,
    products: Cache<ProductId, Product>,
    orders: Mutex<HashMap<OrderId, OrderConfirmation>>,
}

impl MockBackend {
    /// Create a backend serving the given catalog.
    #[must_use]
    pub fn new(catalog: Catalog, config: MockBackendConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(MockBackendInner {
                catalog,
                config,
                rng: Mutex::new(rng),
                products,
                orders: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The catalog this backend serves.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Sleep for a simulated round trip, then draw a failure.
    async fn round_trip(
        &self,
        operation: &'static str,
        failure_rate: f64,
    ) -> Result<(), BackendError> {
        let (delay, failed) = {
            let mut rng = self.rng();
            let LatencyProfile { min_ms, max_ms } = self.inner.config.latency;
            let delay = if max_ms > min_ms {
                rng.random_range(min_ms..=max_ms)
            } else {
                min_ms
            };
            (delay, rng.random_bool(failure_rate.clamp(0.0, 1.0)))
        };

        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if failed {
            warn!(operation, delay_ms = delay, "Simulated backend failure");
            return Err(BackendError::Unavailable { operation });
        }
        debug!(operation, delay_ms = delay, "Backend call completed");
        Ok(())
    }

    fn rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.inner.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn orders(&self) -> std::sync::MutexGuard<'_, HashMap<OrderId, OrderConfirmation>> {
        self.inner.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Short uppercase reference like `PS-1A2B3C4D`.
    fn reference(&self, prefix: &str) -> String {
        let mut bytes = [0u8; 16];
        self.rng().fill_bytes(&mut bytes);
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        let short: String = uuid.simple().to_string().chars().take(8).collect();
        format!("{prefix}-{}", short.to_ascii_uppercase())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List every product.
    ///
    /// # Errors
    ///
    /// Never fails today; the signature matches the fallible operations.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        self.round_trip("catalog", 0.0).await?;
        Ok(self.inner.catalog.products.clone())
    }

    /// Get a product by ID. Results are cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::ProductNotFound` for unknown IDs.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, BackendError> {
        if let Some(product) = self.inner.products.get(id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        self.round_trip("catalog", 0.0).await?;
        let product = self
            .inner
            .catalog
            .product(id)
            .cloned()
            .ok_or_else(|| BackendError::ProductNotFound(id.clone()))?;

        self.inner.products.insert(id.clone(), product.clone()).await;
        Ok(product)
    }

    /// # Errors
    ///
    /// Never fails today; the signature matches the fallible operations.
    #[instrument(skip(self))]
    pub async fn list_shipping_options(&self) -> Result<Vec<ShippingOption>, BackendError> {
        self.round_trip("shipping options", 0.0).await?;
        Ok(self.inner.catalog.shipping_options.clone())
    }

    /// Look up a promo code and check it against the current subtotal.
    ///
    /// # Errors
    ///
    /// Returns `PromoNotFound` for unknown codes and `PromoMinimumNotMet` when
    /// the subtotal is below the code's minimum.
    #[instrument(skip(self))]
    pub async fn lookup_promo(
        &self,
        code: &str,
        subtotal: Decimal,
    ) -> Result<PromoCode, BackendError> {
        self.round_trip("promo lookup", 0.0).await?;

        let promo = self
            .inner
            .catalog
            .promo(code)
            .ok_or_else(|| BackendError::PromoNotFound(crate::catalog::normalize_code(code)))?;

        if !promo.is_applicable(subtotal) {
            return Err(BackendError::PromoMinimumNotMet {
                code: promo.code.clone(),
                minimum: promo.minimum_subtotal.unwrap_or_default(),
            });
        }
        Ok(promo.clone())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Check that an address is deliverable and return its normalized form.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on simulated failure and `UndeliverableAddress`
    /// for unknown states or PO boxes (carriers will not take paint to them).
    #[instrument(skip(self, address), fields(state = %address.state))]
    pub async fn validate_address(
        &self,
        address: &ShippingAddress,
    ) -> Result<ShippingAddress, BackendError> {
        self.round_trip(
            "address validation",
            self.inner.config.failure_rates.address_validation,
        )
        .await?;

        let state = address.state.trim().to_ascii_uppercase();
        if !US_STATES.contains(&state.as_str()) {
            return Err(BackendError::UndeliverableAddress(format!(
                "unknown state {state}"
            )));
        }

        let street = address.address1.to_ascii_uppercase().replace('.', "");
        if street.starts_with("PO BOX") || street.starts_with("POST OFFICE BOX") {
            return Err(BackendError::UndeliverableAddress(
                "paint cannot be shipped to a PO box".to_string(),
            ));
        }

        Ok(ShippingAddress {
            state,
            city: address.city.trim().to_string(),
            address1: address.address1.trim().to_string(),
            ..address.clone()
        })
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on simulated failure. Nothing is recorded then.
    #[instrument(
        skip(self, request),
        fields(items = request.items.len(), total = %request.summary.total)
    )]
    pub async fn submit_order(
        &self,
        request: OrderRequest,
    ) -> Result<OrderConfirmation, BackendError> {
        self.round_trip(
            "order submission",
            self.inner.config.failure_rates.order_submission,
        )
        .await?;

        let order_id = OrderId::new(self.reference("PS"));
        let placed_at = Utc::now();
        let today = placed_at.date_naive();
        let estimated_delivery = today
            .checked_add_days(Days::new(u64::from(request.shipping_option.estimated_days.1)))
            .unwrap_or(today);

        let confirmation = OrderConfirmation {
            mixing_instructions_url: format!(
                "{}/orders/{order_id}/mixing-instructions",
                self.inner.config.base_url.trim_end_matches('/')
            ),
            order_id: order_id.clone(),
            placed_at,
            status: OrderStatus::Received,
            summary: request.summary,
            items: request.items,
            shipping_address: request.shipping_address,
            shipping_option: request.shipping_option,
            payment_summary: request.payment_method.summary(),
            estimated_delivery,
        };

        self.orders().insert(order_id.clone(), confirmation.clone());
        info!(order_id = %order_id, "Order placed");
        Ok(confirmation)
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// # Errors
    ///
    /// Returns `OrderNotFound` for unknown IDs.
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: &OrderId) -> Result<OrderConfirmation, BackendError> {
        self.round_trip("order lookup", 0.0).await?;
        self.orders()
            .get(order_id)
            .cloned()
            .ok_or_else(|| BackendError::OrderNotFound(order_id.clone()))
    }

    /// Fetch the given orders, newest first. Unknown IDs are skipped.
    ///
    /// # Errors
    ///
    /// Never fails today; the signature matches the fallible operations.
    #[instrument(skip(self, order_ids), fields(count = order_ids.len()))]
    pub async fn list_orders(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<OrderConfirmation>, BackendError> {
        self.round_trip("order history", 0.0).await?;
        let orders = self.orders();
        // Session IDs are oldest first; reversing keeps ties newest first.
        let mut found: Vec<OrderConfirmation> = order_ids
            .iter()
            .rev()
            .filter_map(|id| orders.get(id).cloned())
            .collect();
        found.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(found)
    }

    // =========================================================================
    // Returns
    // =========================================================================

    /// File a return (RMA) request against a placed order.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` on simulated failure, `OrderNotFound` for unknown
    /// orders, and `ReturnRejected` when the order is not returnable or a line
    /// was not part of it (or exceeds the quantity ordered).
    #[instrument(
        skip(self, request),
        fields(order_id = %request.order_id, reason = %request.reason)
    )]
    pub async fn submit_return_request(
        &self,
        request: ReturnRequest,
    ) -> Result<ReturnConfirmation, BackendError> {
        self.round_trip(
            "return request",
            self.inner.config.failure_rates.return_request,
        )
        .await?;

        let order = self
            .orders()
            .get(&request.order_id)
            .cloned()
            .ok_or_else(|| BackendError::OrderNotFound(request.order_id.clone()))?;

        if !order.status.is_returnable() {
            return Err(BackendError::ReturnRejected(format!(
                "order {} cannot be returned",
                order.order_id
            )));
        }

        // Repeated keys count against the same ordered line.
        let mut requested: Vec<(&LineKey, u32)> = Vec::with_capacity(request.items.len());
        for line in &request.items {
            match requested.iter_mut().find(|(key, _)| *key == &line.key) {
                Some((_, quantity)) => *quantity = quantity.saturating_add(line.quantity),
                None => requested.push((&line.key, line.quantity)),
            }
        }

        let mut refund_estimate = Decimal::ZERO;
        for (key, quantity) in requested {
            let ordered = order
                .items
                .iter()
                .find(|item| item.key() == *key)
                .ok_or_else(|| {
                    BackendError::ReturnRejected(format!("{key} was not part of this order"))
                })?;
            if quantity > ordered.quantity {
                return Err(BackendError::ReturnRejected(format!(
                    "only {} of {key} were ordered",
                    ordered.quantity
                )));
            }
            refund_estimate += ordered.unit_price * Decimal::from(quantity);
        }

        let confirmation = ReturnConfirmation {
            return_id: ReturnId::new(self.reference("RMA")),
            order_id: request.order_id,
            status: ReturnStatus::Requested,
            refund_estimate,
            created_at: Utc::now(),
        };
        info!(return_id = %confirmation.return_id, "Return requested");
        Ok(confirmation)
    }
}
