//! Integration tests for Paintshop.
//!
//! The storefront router is driven in-process with `tower::ServiceExt::oneshot`;
//! no server or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p paintshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart` - Cart API tests
//! - `checkout` - Checkout wizard and order placement
//! - `account` - Order history and returns

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::str::FromStr;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

use paintshop_storefront::backend::{FailureRates, MockBackendConfig};
use paintshop_storefront::build_router;
use paintshop_storefront::config::StorefrontConfig;
use paintshop_storefront::state::AppState;

/// A response with its body decoded as JSON (or `Value::Null` when the body
/// is not JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestResponse {
    /// Read a decimal field at a JSON pointer, e.g. `/summary/total`.
    ///
    /// # Panics
    ///
    /// Panics if the pointer is missing or not a decimal string.
    #[must_use]
    pub fn decimal(&self, pointer: &str) -> Decimal {
        let raw = self
            .body
            .pointer(pointer)
            .and_then(Value::as_str)
            .unwrap_or_else(|| panic!("no decimal at {pointer} in {}", self.body));
        Decimal::from_str(raw).unwrap_or_else(|e| panic!("bad decimal {raw}: {e}"))
    }
}

/// One visitor talking to an in-process storefront.
///
/// Keeps the session cookie between requests, like a browser would.
#[derive(Clone)]
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Storefront with an instant, never-failing backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StorefrontConfig::for_tests())
    }

    /// Storefront whose backend fails every fallible call.
    #[must_use]
    pub fn failing() -> Self {
        let mut config = StorefrontConfig::for_tests();
        config.backend = MockBackendConfig {
            failure_rates: FailureRates::always(),
            ..MockBackendConfig::instant()
        };
        Self::with_config(config)
    }

    #[must_use]
    pub fn with_config(config: StorefrontConfig) -> Self {
        Self {
            router: build_router(AppState::new(config)),
            cookie: None,
        }
    }

    /// A second visitor on the same storefront, with no session.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Send a request, optionally with a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn request(
        &mut self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap_or_else(|e| panic!("bad request {uri}: {e}"));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| match e {});

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_else(|e| panic!("unreadable body from {uri}: {e}"));
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str, body: Option<Value>) -> TestResponse {
        self.request(Method::DELETE, uri, body).await
    }

    // =========================================================================
    // Flow helpers
    // =========================================================================

    /// Add a line to the cart and assert it succeeded.
    ///
    /// # Panics
    ///
    /// Panics if the storefront rejects the line.
    pub async fn add_to_cart(
        &mut self,
        product: &str,
        color: &str,
        finish: &str,
        quantity: u32,
    ) -> TestResponse {
        let response = self
            .post(
                "/api/cart/items",
                json!({
                    "product_id": product,
                    "color_id": color,
                    "finish_id": finish,
                    "quantity": quantity,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response
    }

    /// Complete the shipping, delivery and payment steps with valid data.
    ///
    /// # Panics
    ///
    /// Panics if any step is rejected.
    pub async fn fill_checkout(&mut self) {
        let response = self.post("/api/checkout/shipping", shipping_address()).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);

        let response = self
            .post(
                "/api/checkout/shipping-option",
                json!({ "shipping_option_id": "standard" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);

        let response = self.post("/api/checkout/payment", card_payment()).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    }

    /// Fill a cart and checkout, then place the order. Returns the order ID.
    ///
    /// # Panics
    ///
    /// Panics if any step fails.
    pub async fn place_order(&mut self) -> String {
        self.add_to_cart("cabinet-enamel", "white", "satin", 2).await;
        self.fill_checkout().await;
        let response = self.post("/api/checkout/place-order", json!({})).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.body["order"]["order_id"]
            .as_str()
            .unwrap_or_else(|| panic!("no order id in {}", response.text))
            .to_string()
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// A deliverable US address.
#[must_use]
pub fn shipping_address() -> Value {
    json!({
        "first_name": "Robin",
        "last_name": "Alvarez",
        "email": "robin@example.com",
        "phone": "(555) 123-4567",
        "address1": "12 Harbor Street",
        "city": "Portland",
        "state": "or",
        "postal_code": "97201",
    })
}

/// A Visa test card that expires well in the future.
#[must_use]
pub fn card_payment() -> Value {
    json!({
        "method": "card",
        "cardholder_name": "Robin Alvarez",
        "card_number": "4242 4242 4242 4242",
        "expiry": "12/40",
        "cvc": "123",
    })
}
