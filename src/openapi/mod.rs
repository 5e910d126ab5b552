use crate::AppState;
use axum::{response::Json, routing::get, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PetCare Payments API",
        version = "1.0.0",
        description = r#"
# PetCare Payments API

Subscription checkout for the PetCare platform, backed by the PayHere hosted checkout.

## Flow

1. The client calls `POST /api/v1/payhere/create-payment` with the order id, amount and currency.
2. The returned fields are posted as-is to the returned `checkoutUrl`.
3. PayHere calls `POST /api/v1/payhere/notify` with a form-encoded notification signed with `md5sig`.
4. The latest status for an order is available at `GET /api/v1/payhere/orders/{order_id}`.

## Error Handling

Errors use a consistent body:

```json
{
  "error": "Bad Request",
  "message": "Invalid signature",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
"#
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "PayHere", description = "Checkout signing and payment notifications"),
        (name = "Plans", description = "Subscription plan catalog"),
        (name = "Health", description = "Service health")
    ),
    paths(
        crate::handlers::payhere::create_payment,
        crate::handlers::payhere::payhere_notify,
        crate::handlers::payhere::get_order_payment,
        crate::handlers::plans::list_plans,
        crate::handlers::plans::get_plan,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::ResponseMeta,
            crate::services::payhere::PaymentRequest,
            crate::services::payhere::NotificationPayload,
            crate::services::payhere::PaymentStatus,
            crate::services::payhere::CheckoutMode,
            crate::services::payment_ledger::PaymentRecord,
            crate::handlers::payhere::CreatePaymentResponse,
            crate::handlers::payhere::NotificationAck,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentStatus,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

/// Serves the generated document at `/api-docs/openapi.json`
pub fn openapi_routes() -> Router<AppState> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDocV1::openapi()) }),
    )
}
