//! Cart and catalog API tests.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use paintshop_integration_tests::TestClient;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let mut client = TestClient::new();
    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text, "ok");
}

#[tokio::test]
async fn test_catalog_listing() {
    let mut client = TestClient::new();

    let products = client.get("/api/products").await;
    assert_eq!(products.status, StatusCode::OK);
    assert_eq!(products.body.as_array().unwrap().len(), 5);

    let product = client.get("/api/products/cabinet-enamel").await;
    assert_eq!(product.status, StatusCode::OK);
    assert_eq!(product.body["name"], "Cabinet & Trim Enamel");
    assert_eq!(product.decimal("/base_price"), dec!(89.99));

    let missing = client.get("/api/products/gold-leaf").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let options = client.get("/api/shipping-options").await;
    assert_eq!(options.status, StatusCode::OK);
    assert_eq!(options.body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_empty_cart_for_new_visitor() {
    let mut client = TestClient::new();
    let response = client.get("/api/cart").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["item_count"], 0);
    assert_eq!(response.body["items"].as_array().unwrap().len(), 0);
    assert_eq!(response.decimal("/subtotal"), dec!(0));
}

#[tokio::test]
async fn test_add_merges_same_color_and_finish() {
    let mut client = TestClient::new();

    client.add_to_cart("signature-interior", "sage-leaf", "eggshell", 1).await;
    client.add_to_cart("signature-interior", "sage-leaf", "eggshell", 2).await;
    let response = client.add_to_cart("signature-interior", "sage-leaf", "satin", 1).await;

    let items = response.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["finish_id"], "eggshell");
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(response.body["item_count"], 4);
    // 3 x 89.99 + 91.99
    assert_eq!(response.decimal("/subtotal"), dec!(361.96));
    assert_eq!(response.body["subtotal_display"], "$361.96");

    // The cart survives between requests.
    let again = client.get("/api/cart").await;
    assert_eq!(again.body["item_count"], 4);
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let mut alice = TestClient::new();
    alice.add_to_cart("bond-primer", "white", "flat", 1).await;

    let mut bob = alice.new_visitor();
    let response = bob.get("/api/cart").await;
    assert_eq!(response.body["item_count"], 0);
}

#[tokio::test]
async fn test_add_rejects_bad_lines() {
    let mut client = TestClient::new();

    let unknown_color = client
        .post(
            "/api/cart/items",
            json!({"product_id": "bond-primer", "color_id": "barn-red", "finish_id": "flat"}),
        )
        .await;
    assert_eq!(unknown_color.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(unknown_color.body["retryable"], false);

    let unknown_product = client
        .post(
            "/api/cart/items",
            json!({"product_id": "gold-leaf", "color_id": "white", "finish_id": "flat"}),
        )
        .await;
    assert_eq!(unknown_product.status, StatusCode::NOT_FOUND);

    let zero = client
        .post(
            "/api/cart/items",
            json!({
                "product_id": "bond-primer",
                "color_id": "white",
                "finish_id": "flat",
                "quantity": 0,
            }),
        )
        .await;
    assert_eq!(zero.status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(client.get("/api/cart").await.body["item_count"], 0);
}

#[tokio::test]
async fn test_update_and_remove() {
    let mut client = TestClient::new();
    client.add_to_cart("cabinet-enamel", "charcoal", "semi-gloss", 1).await;
    client.add_to_cart("bond-primer", "white", "flat", 1).await;

    let key = json!({
        "product_id": "cabinet-enamel",
        "color_id": "charcoal",
        "finish_id": "semi-gloss",
    });

    let mut update = key.clone();
    update["quantity"] = json!(4);
    let response = client.patch("/api/cart/items", update).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    assert_eq!(response.body["items"][0]["quantity"], 4);
    assert_eq!(response.decimal("/items/0/line_total"), dec!(359.96));

    let mut zero = key.clone();
    zero["quantity"] = json!(0);
    let response = client.patch("/api/cart/items", zero).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = client.delete("/api/cart/items", Some(key.clone())).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"].as_array().unwrap().len(), 1);

    // Removing again is a no-op.
    let response = client.delete("/api/cart/items", Some(key)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["item_count"], 1);

    let response = client.delete("/api/cart", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["item_count"], 0);
}

#[tokio::test]
async fn test_bulk_order_applies_trade_tiers() {
    let mut client = TestClient::new();

    let lines = "# primer for the whole building\n\
                 bond-primer,white,flat,40\n\
                 bond-primer,white,flat,20\n\
                 everyday-interior,charcoal,flat,10";
    let response = client.post("/api/cart/bulk", json!({ "lines": lines })).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);

    let items = response.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["quantity"], 60);
    // 15% off 32.99, then 5% off 39.99
    assert_eq!(response.decimal("/items/0/unit_price"), dec!(28.0415));
    assert_eq!(response.decimal("/items/1/unit_price"), dec!(37.9905));
}

#[tokio::test]
async fn test_bulk_order_and_regular_add_share_one_trade_line() {
    let mut client = TestClient::new();
    client.add_to_cart("bond-primer", "white", "flat", 1).await;

    let response = client
        .post("/api/cart/bulk", json!({"lines": "bond-primer,white,flat,49"}))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    assert_eq!(response.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["items"][0]["quantity"], 50);
    assert_eq!(response.body["items"][0]["trade"], true);
    assert_eq!(response.decimal("/items/0/unit_price"), dec!(28.0415));

    // A regular add keeps the line on the trade tiers.
    let response = client.add_to_cart("bond-primer", "white", "flat", 1).await;
    assert_eq!(response.body["items"][0]["trade"], true);
    assert_eq!(response.decimal("/items/0/unit_price"), dec!(28.0415));
    assert_eq!(response.decimal("/items/0/list_price"), dec!(32.99));

    // Dropping below a tier boundary reprices the line.
    let response = client
        .patch(
            "/api/cart/items",
            json!({
                "product_id": "bond-primer",
                "color_id": "white",
                "finish_id": "flat",
                "quantity": 10,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);
    assert_eq!(response.decimal("/items/0/unit_price"), dec!(31.3405));
}

#[tokio::test]
async fn test_bulk_order_is_all_or_nothing() {
    let mut client = TestClient::new();

    let response = client
        .post(
            "/api/cart/bulk",
            json!({"lines": "bond-primer,white,flat,10\nnot a line"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["fields"][0]["field"], "lines[2]");

    let response = client
        .post(
            "/api/cart/bulk",
            json!({"lines": "bond-primer,white,flat,10\ngold-leaf,white,flat,10"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(client.get("/api/cart").await.body["item_count"], 0);
}
