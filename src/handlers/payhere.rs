use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::services::payhere::{
    CheckoutPayload, NotificationPayload, NotificationVerifier, PaymentIntentBuilder,
    PaymentRequest,
};
use crate::services::payment_ledger::{LedgerOutcome, PaymentRecord};
use crate::{ApiResponse, ApiResult};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Form, Json, Path, State,
    },
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub merchant_id: String,
    pub order_id: String,
    /// Amount exactly as hashed; submit it unchanged
    #[schema(example = "2400.00")]
    pub amount: String,
    pub currency: String,
    pub hash: String,
    pub checkout_url: String,
}

impl From<CheckoutPayload> for CreatePaymentResponse {
    fn from(payload: CheckoutPayload) -> Self {
        Self {
            success: true,
            merchant_id: payload.merchant_id,
            order_id: payload.order_id,
            amount: payload.amount,
            currency: payload.currency,
            hash: payload.hash,
            checkout_url: payload.checkout_url,
        }
    }
}

/// Acknowledgement body the gateway expects with a 200
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationAck {
    #[schema(example = "success")]
    pub status: String,
}

impl NotificationAck {
    fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

pub fn payhere_routes() -> Router<AppState> {
    Router::new()
        .route("/payhere/create-payment", post(create_payment))
        .route("/payhere/notify", post(payhere_notify))
        .route("/payhere/orders/:order_id", get(get_order_payment))
}

/// Sign a checkout for the PayHere payment form
#[utoipa::path(
    post,
    path = "/api/v1/payhere/create-payment",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Signed checkout payload", body = CreatePaymentResponse),
        (status = 400, description = "Invalid payment request", body = crate::errors::ErrorResponse),
        (status = 500, description = "Gateway not configured", body = crate::errors::ErrorResponse)
    ),
    tag = "PayHere"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<CreatePaymentResponse>, ServiceError> {
    let Json(request) = payload.map_err(|rejection| {
        ServiceError::BadRequest(format!("invalid payment request: {}", rejection.body_text()))
    })?;

    let checkout = PaymentIntentBuilder::new(state.payhere.clone()).create_payment(&request)?;
    Ok(Json(checkout.into()))
}

/// Server-to-server payment notification from PayHere
#[utoipa::path(
    post,
    path = "/api/v1/payhere/notify",
    request_body(content = NotificationPayload, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Notification accepted", body = NotificationAck),
        (status = 400, description = "Invalid signature or form", body = crate::errors::ErrorResponse),
        (status = 500, description = "Gateway not configured", body = crate::errors::ErrorResponse)
    ),
    tag = "PayHere"
)]
pub async fn payhere_notify(
    State(state): State<AppState>,
    payload: Result<Form<NotificationPayload>, FormRejection>,
) -> Result<Json<NotificationAck>, ServiceError> {
    let Form(notification) = payload.map_err(|rejection| {
        ServiceError::BadRequest(format!("invalid notification: {}", rejection.body_text()))
    })?;

    let verifier = NotificationVerifier::new(state.payhere.clone());
    let verified = verifier.verify(&notification)?;

    match state.ledger.apply(&verified) {
        LedgerOutcome::Applied(record) => {
            info!(
                order_id = %record.order_id,
                payment_id = %record.payment_id,
                status = %record.status,
                "payment status updated"
            );
        }
        LedgerOutcome::Duplicate => {
            info!(
                order_id = %verified.order_id,
                status_code = %verified.status_code,
                "notification already processed"
            );
        }
        LedgerOutcome::Stale { current } => {
            warn!(
                order_id = %verified.order_id,
                incoming = %verified.status,
                %current,
                "ignoring notification after final status"
            );
        }
    }

    Ok(Json(NotificationAck::success()))
}

/// Latest payment status recorded for an order
#[utoipa::path(
    get,
    path = "/api/v1/payhere/orders/{order_id}",
    params(("order_id" = String, Path, description = "Merchant order id")),
    responses(
        (status = 200, description = "Payment record", body = PaymentRecord),
        (status = 404, description = "No notification received for the order", body = crate::errors::ErrorResponse)
    ),
    tag = "PayHere"
)]
pub async fn get_order_payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> ApiResult<PaymentRecord> {
    state
        .ledger
        .get(&order_id)
        .map(|record| Json(ApiResponse::success(record)))
        .ok_or_else(|| ServiceError::NotFound(format!("no payment recorded for order {}", order_id)))
}
