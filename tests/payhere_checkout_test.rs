//! Integration tests for checkout signing.
//!
//! Tests cover:
//! - Signed payload shape and known-answer hashes
//! - Amount normalization
//! - Request validation
//! - Missing gateway configuration

mod common;

use axum::http::StatusCode;
use common::{response_json, TestApp, MERCHANT_ID};
use petcare_payments::config::PayHereConfig;
use serde_json::{json, Value};

const CREATE_PAYMENT: &str = "/api/v1/payhere/create-payment";

fn order_request(order_id: &str, amount: Value) -> Value {
    json!({
        "orderId": order_id,
        "amount": amount,
        "currency": "LKR",
        "planId": "pet-pharmacies",
        "planName": "Pet Pharmacies"
    })
}

// ==================== Signing Tests ====================

#[tokio::test]
async fn create_payment_returns_signed_sandbox_checkout() {
    let app = TestApp::new();

    let response = app
        .post_json(CREATE_PAYMENT, &order_request("ORDER123", json!(1000)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["merchantId"], MERCHANT_ID);
    assert_eq!(body["orderId"], "ORDER123");
    assert_eq!(body["amount"], "1000.00");
    assert_eq!(body["currency"], "LKR");
    assert_eq!(body["hash"], "9662BDB1D0752D216351C08E9881BDD0");
    assert_eq!(body["checkoutUrl"], "https://sandbox.payhere.lk/pay/checkout");
}

#[tokio::test]
async fn string_amounts_are_accepted() {
    let app = TestApp::new();

    let response = app
        .post_json(CREATE_PAYMENT, &order_request("ORDER123", json!("1000")))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["amount"], "1000.00");
    assert_eq!(body["hash"], "9662BDB1D0752D216351C08E9881BDD0");
}

#[tokio::test]
async fn base64_exported_secret_is_decoded_before_signing() {
    let app = TestApp::with_payhere(PayHereConfig {
        merchant_id: Some(MERCHANT_ID.to_string()),
        merchant_secret: Some("bXktcGxhaW4tc2VjcmV0".to_string()),
        mode: "sandbox".to_string(),
    });

    let response = app
        .post_json(CREATE_PAYMENT, &order_request("ORDER123", json!(1000)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["hash"], "0A78FE8A367861933073514572875609");
}

#[tokio::test]
async fn production_mode_uses_live_checkout_url() {
    let app = TestApp::with_payhere(PayHereConfig {
        merchant_id: Some(MERCHANT_ID.to_string()),
        merchant_secret: Some("SECRET".to_string()),
        mode: "production".to_string(),
    });

    let response = app
        .post_json(CREATE_PAYMENT, &order_request("ORDER123", json!(1000)))
        .await;
    let body = response_json(response).await;
    assert_eq!(body["checkoutUrl"], "https://www.payhere.lk/pay/checkout");
    // mode does not affect the hash
    assert_eq!(body["hash"], "9662BDB1D0752D216351C08E9881BDD0");
}

#[tokio::test]
async fn amounts_are_rounded_to_two_decimals() {
    let app = TestApp::new();

    for (amount, expected) in [
        (json!(2400), "2400.00"),
        (json!("10000.5"), "10000.50"),
        (json!("999.995"), "1000.00"),
        (json!("0.005"), "0.01"),
    ] {
        let response = app
            .post_json(CREATE_PAYMENT, &order_request("ORDER-ROUND", amount))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["amount"], expected);
    }
}

// ==================== Validation Tests ====================

#[tokio::test]
async fn missing_fields_are_rejected() {
    let app = TestApp::new();

    let cases = [
        json!({ "amount": 1000, "currency": "LKR", "planId": "pet-owners" }),
        json!({ "orderId": "O-1", "currency": "LKR", "planId": "pet-owners" }),
        json!({ "orderId": "O-1", "amount": 1000, "planId": "pet-owners" }),
        json!({ "orderId": "O-1", "amount": 1000, "currency": "LKR" }),
        json!({ "orderId": "   ", "amount": 1000, "currency": "LKR", "planId": "pet-owners" }),
    ];

    for payload in cases {
        let response = app.post_json(CREATE_PAYMENT, &payload).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "payload should be rejected: {payload}"
        );
        let body = response_json(response).await;
        assert_eq!(body["error"], "Bad Request");
    }
}

#[tokio::test]
async fn unsignable_amounts_are_rejected() {
    let app = TestApp::new();

    for amount in [
        json!(0),
        json!(-5),
        json!("0.004"),
        json!("79228162514264337593543950335"),
    ] {
        let response = app
            .post_json(CREATE_PAYMENT, &order_request("ORDER-ZERO", amount))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new();

    let response = app
        .post_raw(CREATE_PAYMENT, "application/json", "{\"orderId\": ")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(CREATE_PAYMENT, &order_request("O-1", json!("lots")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ==================== Configuration Tests ====================

#[tokio::test]
async fn unconfigured_gateway_returns_server_error() {
    let app = TestApp::unconfigured();

    let response = app
        .post_json(CREATE_PAYMENT, &order_request("ORDER123", json!(1000)))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Payment gateway not configured");
    assert!(body.get("hash").is_none());
}

#[tokio::test]
async fn validation_runs_before_configuration_check() {
    let app = TestApp::unconfigured();

    let response = app
        .post_json(CREATE_PAYMENT, &json!({ "currency": "LKR" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
