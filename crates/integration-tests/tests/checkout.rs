//! Checkout wizard and order placement tests.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use paintshop_integration_tests::{TestClient, card_payment, shipping_address};
use paintshop_storefront::backend::{FailureRates, MockBackendConfig};
use paintshop_storefront::config::StorefrontConfig;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn test_fresh_checkout_starts_at_shipping() {
    let mut client = TestClient::new();
    let response = client.get("/api/checkout").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["step"], "shipping");
    assert_eq!(response.body["step_number"], 1);
    assert!(response.body.get("order").is_none());
    assert_eq!(response.decimal("/summary/total"), dec!(0));
}

#[tokio::test]
async fn test_full_checkout_flow() {
    let mut client = TestClient::new();
    client.add_to_cart("cabinet-enamel", "white", "satin", 2).await;
    client.fill_checkout().await;

    let review = client.post("/api/checkout/step", json!({"step": 3})).await;
    assert_eq!(review.status, StatusCode::OK, "{}", review.text);
    assert_eq!(review.body["step"], "review");
    assert_eq!(review.body["form"]["shipping_address"]["state"], "OR");
    assert_eq!(review.decimal("/summary/subtotal"), dec!(179.98));
    assert_eq!(review.decimal("/summary/shipping"), dec!(9.99));
    assert_eq!(review.decimal("/summary/tax"), dec!(14.3984));
    assert_eq!(review.decimal("/summary/total"), dec!(204.3684));

    // Review does not advance on its own.
    let still_review = client.post("/api/checkout/next", json!({})).await;
    assert_eq!(still_review.body["step"], "review");

    let placed = client.post("/api/checkout/place-order", json!({})).await;
    assert_eq!(placed.status, StatusCode::OK, "{}", placed.text);
    assert_eq!(placed.body["step"], "confirmation");
    assert_eq!(placed.body["step_number"], 4);

    let order = &placed.body["order"];
    assert!(order["order_id"].as_str().unwrap().starts_with("PS-"));
    assert_eq!(order["status"], "received");
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert!(order["mixing_instructions_url"].as_str().unwrap().contains("PS-"));
    assert_eq!(placed.decimal("/order/summary/total"), dec!(204.3684));
    // The summary still shows what was ordered.
    assert_eq!(placed.decimal("/summary/total"), dec!(204.3684));

    let cart = client.get("/api/cart").await;
    assert_eq!(cart.body["item_count"], 0);
}

#[tokio::test]
async fn test_confirmation_is_terminal() {
    let mut client = TestClient::new();
    client.place_order().await;

    let back = client.post("/api/checkout/back", json!({})).await;
    assert_eq!(back.body["step"], "confirmation");

    let jump = client.post("/api/checkout/step", json!({"step": 1})).await;
    assert_eq!(jump.status, StatusCode::CONFLICT);

    let again = client.post("/api/checkout/place-order", json!({})).await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let edit = client.post("/api/checkout/shipping", shipping_address()).await;
    assert_eq!(edit.status, StatusCode::CONFLICT);

    let reset = client.delete("/api/checkout", None).await;
    assert_eq!(reset.status, StatusCode::OK);
    assert_eq!(reset.body["step"], "shipping");
    assert!(reset.body.get("order").is_none());
    assert!(reset.body["form"]["shipping_address"].is_null());
}

#[tokio::test]
async fn test_step_navigation_is_gated() {
    let mut client = TestClient::new();

    let locked = client.post("/api/checkout/step", json!({"step": 3})).await;
    assert_eq!(locked.status, StatusCode::CONFLICT);

    let unknown = client.post("/api/checkout/step", json!({"step": 9})).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let next = client.post("/api/checkout/next", json!({})).await;
    assert_eq!(next.body["step"], "payment");
    let back = client.post("/api/checkout/back", json!({})).await;
    assert_eq!(back.body["step"], "shipping");
    let back = client.post("/api/checkout/back", json!({})).await;
    assert_eq!(back.body["step"], "shipping");
}

#[tokio::test]
async fn test_shipping_validation_lists_fields() {
    let mut client = TestClient::new();

    let response = client.post("/api/checkout/shipping", json!({})).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let fields: Vec<&str> = response.body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    for field in ["first_name", "last_name", "email", "address1", "city", "state"] {
        assert!(fields.contains(&field), "{field} missing from {fields:?}");
    }

    let mut bad_zip = shipping_address();
    bad_zip["postal_code"] = json!("9720");
    let response = client.post("/api/checkout/shipping", bad_zip).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["fields"][0]["field"], "postal_code");

    // Nothing was stored.
    let checkout = client.get("/api/checkout").await;
    assert!(checkout.body["form"]["shipping_address"].is_null());
}

#[tokio::test]
async fn test_po_box_is_undeliverable() {
    let mut client = TestClient::new();
    let mut address = shipping_address();
    address["address1"] = json!("P.O. Box 1200");

    let response = client.post("/api/checkout/shipping", address).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["retryable"], false);
}

#[tokio::test]
async fn test_separate_billing_address() {
    let mut client = TestClient::new();
    let mut request = shipping_address();
    request["same_as_shipping"] = json!(false);

    let missing = client.post("/api/checkout/shipping", request.clone()).await;
    assert_eq!(missing.status, StatusCode::UNPROCESSABLE_ENTITY);

    let mut billing = shipping_address();
    billing["city"] = json!("Salem");
    request["billing_address"] = billing;
    let response = client.post("/api/checkout/shipping", request).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    assert_eq!(response.body["form"]["billing_address"]["city"], "Salem");
}

#[tokio::test]
async fn test_payment_validation() {
    let mut client = TestClient::new();

    let mut bad_card = card_payment();
    bad_card["card_number"] = json!("4242 4242 4242 4241");
    bad_card["expiry"] = json!("01/20");
    let response = client.post("/api/checkout/payment", bad_card).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = response.body["fields"].as_array().unwrap();
    assert!(fields.iter().any(|f| f["field"] == "card_number"));
    assert!(fields.iter().any(|f| f["field"] == "expiry"));

    let paypal = client
        .post(
            "/api/checkout/payment",
            json!({"method": "paypal", "paypal_email": "robin@example.com"}),
        )
        .await;
    assert_eq!(paypal.status, StatusCode::OK, "{}", paypal.text);
}

#[tokio::test]
async fn test_unknown_shipping_option() {
    let mut client = TestClient::new();
    let response = client
        .post(
            "/api/checkout/shipping-option",
            json!({"shipping_option_id": "teleport"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_promo_codes() {
    let mut client = TestClient::new();
    client.add_to_cart("cabinet-enamel", "white", "satin", 2).await;
    client.fill_checkout().await;

    let unknown = client.post("/api/checkout/promo", json!({"code": "BOGUS"})).await;
    assert_eq!(unknown.status, StatusCode::UNPROCESSABLE_ENTITY);

    // 179.98 is under the $200 minimum.
    let below_minimum = client.post("/api/checkout/promo", json!({"code": "SAVE25"})).await;
    assert_eq!(below_minimum.status, StatusCode::UNPROCESSABLE_ENTITY);

    let applied = client.post("/api/checkout/promo", json!({"code": " save10 "})).await;
    assert_eq!(applied.status, StatusCode::OK, "{}", applied.text);
    assert_eq!(applied.body["summary"]["applied_promo"], "SAVE10");
    assert_eq!(applied.decimal("/summary/discount"), dec!(17.998));
    assert_eq!(applied.decimal("/summary/tax"), dec!(12.95856));
    assert_eq!(applied.decimal("/summary/total"), dec!(184.93056));

    let free_shipping = client.post("/api/checkout/promo", json!({"code": "FREESHIP"})).await;
    assert_eq!(free_shipping.decimal("/summary/shipping"), dec!(0));
    assert_eq!(free_shipping.decimal("/summary/discount"), dec!(0));

    let removed = client.delete("/api/checkout/promo", None).await;
    assert_eq!(removed.status, StatusCode::OK);
    assert!(removed.body["summary"].get("applied_promo").is_none());
    assert_eq!(removed.decimal("/summary/shipping"), dec!(9.99));
}

#[tokio::test]
async fn test_minimum_spend_promo_lapses_when_cart_shrinks() {
    let mut client = TestClient::new();
    client.add_to_cart("cabinet-enamel", "white", "satin", 3).await;

    let applied = client.post("/api/checkout/promo", json!({"code": "SAVE25"})).await;
    assert_eq!(applied.status, StatusCode::OK, "{}", applied.text);
    assert_eq!(applied.decimal("/summary/discount"), dec!(25));

    client
        .patch(
            "/api/cart/items",
            json!({
                "product_id": "cabinet-enamel",
                "color_id": "white",
                "finish_id": "satin",
                "quantity": 1,
            }),
        )
        .await;

    let checkout = client.get("/api/checkout").await;
    assert_eq!(checkout.body["summary"]["rejected_promo"], "SAVE25");
    assert_eq!(checkout.decimal("/summary/discount"), dec!(0));
}

#[tokio::test]
async fn test_place_order_preconditions() {
    let mut client = TestClient::new();

    let empty = client.post("/api/checkout/place-order", json!({})).await;
    assert_eq!(empty.status, StatusCode::CONFLICT);

    client.add_to_cart("bond-primer", "white", "flat", 1).await;
    let incomplete = client.post("/api/checkout/place-order", json!({})).await;
    assert_eq!(incomplete.status, StatusCode::CONFLICT);
    assert!(incomplete.body["error"].as_str().unwrap().contains("shipping address"));

    let orders = client.get("/api/account/orders").await;
    assert_eq!(orders.body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_order_failure_leaves_state_for_retry() {
    let mut config = StorefrontConfig::for_tests();
    config.backend = MockBackendConfig {
        failure_rates: FailureRates {
            order_submission: 1.0,
            ..FailureRates::never()
        },
        ..MockBackendConfig::instant()
    };
    let mut client = TestClient::with_config(config);
    client.add_to_cart("cabinet-enamel", "white", "satin", 2).await;
    client.fill_checkout().await;
    client.post("/api/checkout/step", json!({"step": 3})).await;

    let response = client.post("/api/checkout/place-order", json!({})).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["retryable"], true);

    let checkout = client.get("/api/checkout").await;
    assert_eq!(checkout.body["step"], "review");
    assert!(checkout.body.get("order").is_none());
    assert_eq!(client.get("/api/cart").await.body["item_count"], 2);
}

#[tokio::test]
async fn test_address_validation_outage() {
    let mut client = TestClient::failing();
    let response = client.post("/api/checkout/shipping", shipping_address()).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["retryable"], true);
}
