//! Integration tests for shipment orchestration.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and seed data
//! - The server running (cargo run -p kebuncuan-server)
//! - `TEST_BUYER_COOKIE` / `TEST_MERCHANT_COOKIE` session cookies
//! - A Biteship test API key in the server environment
//!
//! Run with: cargo test -p kebuncuan-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use kebuncuan_integration_tests::{base_url, buyer_client, demo_store, merchant_client};

fn recipient() -> Value {
    json!({
        "name": "Budi Santoso",
        "phone": "+6281200000002",
        "address": "Jl. Melati No. 2, Depok",
        "postal_code": "16411",
    })
}

/// Create a shipping-required order as the buyer and return its id.
async fn create_order(shipping: bool) -> i64 {
    let client = buyer_client();

    let mut body = json!({
        "store": demo_store(),
        "product_id": 1,
        "quantity": 1,
        "payment_method": "bank_transfer",
        "recipient": recipient(),
    });
    if shipping {
        body["shipping"] = json!({
            "courier_company": "jne",
            "courier_type": "reg",
            "price": "15000",
        });
    }

    let resp = client
        .post(format!("{}/api/checkout", base_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Failed to parse checkout body");
    body["orders"][0]["id"].as_i64().expect("order id")
}

/// Mark an order PAID as the merchant (stands in for the payment gateway
/// confirmation).
async fn mark_paid(order_id: i64) {
    let client = merchant_client();
    let resp = client
        .patch(format!(
            "{}/api/store/{}/orders/{order_id}",
            base_url(),
            demo_store()
        ))
        .json(&json!({ "status": "PAID" }))
        .send()
        .await
        .expect("Failed to mark order paid");
    assert_eq!(resp.status(), StatusCode::OK);
}

async fn ship(order_id: i64) -> reqwest::Response {
    merchant_client()
        .post(format!(
            "{}/api/store/{}/orders/{order_id}/ship",
            base_url(),
            demo_store()
        ))
        .send()
        .await
        .expect("Failed to send ship request")
}

#[tokio::test]
#[ignore = "Requires running server, database, session cookies, and provider key"]
async fn test_ship_unpaid_order_is_rejected() {
    let order_id = create_order(true).await;

    let resp = ship(order_id).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert!(
        body["error"]
            .as_str()
            .expect("error string")
            .contains("not settled")
    );
}

#[tokio::test]
#[ignore = "Requires running server, database, session cookies, and provider key"]
async fn test_ship_non_shipping_order_is_rejected() {
    let order_id = create_order(false).await;
    mark_paid(order_id).await;

    let resp = ship(order_id).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert!(
        body["error"]
            .as_str()
            .expect("error string")
            .contains("does not require shipping")
    );
}

#[tokio::test]
#[ignore = "Requires running server, database, session cookies, and provider key"]
async fn test_second_shipment_for_same_order_conflicts() {
    let order_id = create_order(true).await;
    mark_paid(order_id).await;

    let first = ship(order_id).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let shipment: Value = first.json().await.expect("Failed to parse shipment");
    assert!(shipment["biteship_order_id"].is_string());

    // Exactly-once: the retry must conflict, not double-allocate
    let second = ship(order_id).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running server, database, session cookies, and provider key"]
async fn test_ship_as_non_owner_is_not_found() {
    let order_id = create_order(true).await;
    mark_paid(order_id).await;

    // The buyer does not own the store; ownership mismatch reads as 404
    let resp = buyer_client()
        .post(format!(
            "{}/api/store/{}/orders/{order_id}/ship",
            base_url(),
            demo_store()
        ))
        .send()
        .await
        .expect("Failed to send ship request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server, database, session cookies, and provider key"]
async fn test_illegal_status_transition_conflicts() {
    let order_id = create_order(true).await;

    let client = merchant_client();
    let cancel = |status: &str| {
        let client = client.clone();
        let status = status.to_string();
        async move {
            client
                .patch(format!(
                    "{}/api/store/{}/orders/{order_id}",
                    base_url(),
                    demo_store()
                ))
                .json(&json!({ "status": status }))
                .send()
                .await
                .expect("Failed to update status")
        }
    };

    let resp = cancel("CANCELLED").await;
    assert_eq!(resp.status(), StatusCode::OK);

    // A cancelled order can never be re-marked paid
    let resp = cancel("PAID").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running server, database, session cookies, and provider key"]
async fn test_rate_quotes_for_seeded_store() {
    let resp = buyer_client()
        .post(format!(
            "{}/api/store/{}/shipping/rates",
            base_url(),
            demo_store()
        ))
        .json(&json!({
            "destination": { "postal_code": "16411" },
            "items": [{ "product_id": 1, "quantity": 2 }],
        }))
        .send()
        .await
        .expect("Failed to quote rates");

    assert_eq!(resp.status(), StatusCode::OK);
    let rates: Value = resp.json().await.expect("Failed to parse rates");
    assert!(!rates.as_array().expect("rates array").is_empty());
}

#[tokio::test]
#[ignore = "Requires running server, database, session cookies, and provider key"]
async fn test_label_for_unknown_shipment_is_not_found() {
    let resp = merchant_client()
        .get(format!(
            "{}/api/store/{}/shipping/shipments/999999999/label",
            base_url(),
            demo_store()
        ))
        .send()
        .await
        .expect("Failed to fetch label");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server, database, session cookies, and provider key"]
async fn test_tracking_unknown_waybill_is_not_found() {
    let resp = merchant_client()
        .post(format!(
            "{}/api/store/{}/shipping/track/NOSUCHWAYBILL",
            base_url(),
            demo_store()
        ))
        .json(&json!({ "courier": "jne" }))
        .send()
        .await
        .expect("Failed to track");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
