//! Integration tests for checkout totals and order creation.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and seed data
//! - The server running (cargo run -p kebuncuan-server)
//! - `TEST_BUYER_COOKIE` holding an authenticated buyer session
//!
//! Run with: cargo test -p kebuncuan-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use kebuncuan_integration_tests::{base_url, buyer_client, demo_store};

fn recipient() -> Value {
    json!({
        "name": "Budi Santoso",
        "phone": "+6281200000002",
        "address": "Jl. Melati No. 2, Depok",
        "postal_code": "16411",
    })
}

#[tokio::test]
#[ignore = "Requires running server, database, and session cookies"]
async fn test_buy_now_totals() {
    let client = buyer_client();

    // Seeded product: Pupuk Organik 1kg at 50_000; tax disabled on the
    // demo store. 50_000 x 2 + 15_000 shipping = 115_000.
    let resp = client
        .post(format!("{}/api/checkout", base_url()))
        .json(&json!({
            "store": demo_store(),
            "product_id": 1,
            "quantity": 2,
            "shipping": {
                "courier_company": "jne",
                "courier_type": "reg",
                "price": "15000",
            },
            "payment_method": "bank_transfer",
            "recipient": recipient(),
        }))
        .send()
        .await
        .expect("Failed to checkout");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse checkout body");

    let orders = body["orders"].as_array().expect("orders array");
    assert_eq!(orders.len(), 1);

    let order = &orders[0];
    assert_eq!(order["status"], json!("PENDING"));
    assert_eq!(order["payment_status"], json!("PENDING"));
    assert_eq!(order["subtotal"], json!("100000"));
    assert_eq!(order["shipping_cost"], json!("15000"));
    assert_eq!(order["tax"], json!("0"));
    assert_eq!(order["total"], json!("115000"));

    let invoice = order["invoice"].as_str().expect("invoice string");
    assert!(invoice.starts_with("KC-"));
    assert_eq!(
        body["payment_redirect"],
        json!(format!("/payment/{invoice}"))
    );
}

#[tokio::test]
#[ignore = "Requires running server, database, and session cookies"]
async fn test_cart_checkout_creates_one_order_per_line_and_clears_cart() {
    let client = buyer_client();

    // Two distinct seeded products in the cart
    for (product_id, quantity) in [(1, 1), (2, 3)] {
        let resp = client
            .post(format!("{}/api/cart", base_url()))
            .json(&json!({
                "store": demo_store(),
                "product_id": product_id,
                "quantity": quantity,
            }))
            .send()
            .await
            .expect("Failed to add to cart");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = client
        .post(format!("{}/api/checkout", base_url()))
        .json(&json!({
            "store": demo_store(),
            "shipping": {
                "courier_company": "jne",
                "courier_type": "reg",
                "price": "15000",
            },
            "payment_method": "bank_transfer",
            "recipient": recipient(),
        }))
        .send()
        .await
        .expect("Failed to checkout");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse checkout body");
    assert_eq!(body["orders"].as_array().expect("orders array").len(), 2);

    // Cart drained atomically with order creation
    let resp = client
        .get(format!("{}/api/cart", base_url()))
        .query(&[("store", demo_store())])
        .send()
        .await
        .expect("Failed to fetch cart");
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["lines"].as_array().expect("lines array").len(), 0);
}

#[tokio::test]
#[ignore = "Requires running server, database, and session cookies"]
async fn test_checkout_empty_cart_is_rejected() {
    let client = buyer_client();

    let resp = client
        .post(format!("{}/api/checkout", base_url()))
        .json(&json!({
            "store": demo_store(),
            "payment_method": "bank_transfer",
            "recipient": recipient(),
        }))
        .send()
        .await
        .expect("Failed to checkout");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running server, database, and session cookies"]
async fn test_checkout_missing_recipient_is_rejected() {
    let client = buyer_client();

    let resp = client
        .post(format!("{}/api/checkout", base_url()))
        .json(&json!({
            "store": demo_store(),
            "product_id": 1,
            "quantity": 1,
            "payment_method": "bank_transfer",
            "recipient": {
                "name": "",
                "phone": "",
                "address": "",
            },
        }))
        .send()
        .await
        .expect("Failed to checkout");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert!(
        body["error"]
            .as_str()
            .expect("error string")
            .contains("missing required field")
    );
}
