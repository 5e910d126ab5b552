#![allow(dead_code)]

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use petcare_payments::{
    config::{AppConfig, PayHereConfig},
    services::payhere::signature,
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub const MERCHANT_ID: &str = "1211149";
pub const SECRET: &str = "SECRET";

/// Helper harness wrapping the full application router with in-memory state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Sandbox application with test merchant credentials.
    pub fn new() -> Self {
        Self::with_payhere(PayHereConfig {
            merchant_id: Some(MERCHANT_ID.to_string()),
            merchant_secret: Some(SECRET.to_string()),
            mode: "sandbox".to_string(),
        })
    }

    /// Application started without merchant credentials.
    pub fn unconfigured() -> Self {
        Self::with_payhere(PayHereConfig::default())
    }

    pub fn with_payhere(payhere: PayHereConfig) -> Self {
        let mut cfg = AppConfig::new("127.0.0.1".to_string(), 18_080, "test".to_string());
        cfg.payhere = payhere;
        Self::with_config(cfg)
    }

    pub fn with_config(cfg: AppConfig) -> Self {
        let state = AppState::from_config(cfg);
        Self {
            router: petcare_payments::app(state.clone()),
            state,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request");
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(body).expect("failed to serialize json request body"),
            ))
            .expect("failed to build request");
        self.send(request).await
    }

    pub async fn post_raw(&self, uri: &str, content_type: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", content_type)
            .body(Body::from(body.to_string()))
            .expect("failed to build request");
        self.send(request).await
    }

    /// POST an `application/x-www-form-urlencoded` body built from `fields`.
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.post_raw(uri, "application/x-www-form-urlencoded", &encoded)
            .await
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// A notification as the gateway would send it, signed with the test secret.
pub fn signed_notification(
    order_id: &str,
    amount: &str,
    status_code: &str,
) -> Vec<(&'static str, String)> {
    let md5sig =
        signature::notification_signature(MERCHANT_ID, order_id, amount, "LKR", status_code, SECRET);
    vec![
        ("merchant_id", MERCHANT_ID.to_string()),
        ("order_id", order_id.to_string()),
        ("payment_id", "320025071278".to_string()),
        ("payhere_amount", amount.to_string()),
        ("payhere_currency", "LKR".to_string()),
        ("status_code", status_code.to_string()),
        ("md5sig", md5sig),
        ("method", "VISA".to_string()),
        ("status_message", "Successfully completed the payment.".to_string()),
    ]
}

pub fn as_pairs<'a>(fields: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
}
