use super::{signature, PayHereSettings};
use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;

/// Payment notification fields, named exactly as the gateway posts them.
///
/// Absent fields deserialize as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NotificationPayload {
    #[serde(default)]
    pub merchant_id: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub payhere_amount: String,
    #[serde(default)]
    pub payhere_currency: String,
    /// 2 success, 0 pending, -1 canceled, -2 failed, -3 charged back
    #[serde(default)]
    pub status_code: String,
    #[serde(default)]
    pub md5sig: String,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub custom_1: String,
    #[serde(default)]
    pub custom_2: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Success,
    Pending,
    Canceled,
    Failed,
    ChargedBack,
    Unknown,
}

impl PaymentStatus {
    /// Maps a raw gateway status code. Codes are matched exactly as sent.
    pub fn from_status_code(code: &str) -> Self {
        match code {
            "2" => PaymentStatus::Success,
            "0" => PaymentStatus::Pending,
            "-1" => PaymentStatus::Canceled,
            "-2" => PaymentStatus::Failed,
            "-3" => PaymentStatus::ChargedBack,
            _ => PaymentStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "success",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Canceled => "canceled",
            PaymentStatus::Failed => "failed",
            PaymentStatus::ChargedBack => "charged_back",
            PaymentStatus::Unknown => "unknown",
        }
    }

    /// Whether the gateway has reached a final outcome for the payment.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Success
                | PaymentStatus::Canceled
                | PaymentStatus::Failed
                | PaymentStatus::ChargedBack
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated notification, ready to be applied by a persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerifiedNotification {
    pub status: PaymentStatus,
    /// Raw gateway code, kept for de-duplication
    pub status_code: String,
    pub order_id: String,
    pub payment_id: String,
    pub amount: String,
    pub currency: String,
    pub method: String,
    pub status_message: String,
    pub custom_1: String,
    pub custom_2: String,
}

/// Authenticates gateway notifications against the merchant secret.
#[derive(Debug, Clone)]
pub struct NotificationVerifier {
    settings: Arc<PayHereSettings>,
}

impl NotificationVerifier {
    pub fn new(settings: Arc<PayHereSettings>) -> Self {
        Self { settings }
    }

    /// Verifies `md5sig` and maps the status code.
    ///
    /// The configured secret is used as-is; the checkout path's base64
    /// normalization is not applied here.
    #[instrument(skip_all, fields(order_id = %payload.order_id, status_code = %payload.status_code))]
    pub fn verify(&self, payload: &NotificationPayload) -> Result<VerifiedNotification, ServiceError> {
        let credentials = self.settings.credentials()?;

        let valid = signature::verify_signature(
            &payload.merchant_id,
            &payload.order_id,
            &payload.payhere_amount,
            &payload.payhere_currency,
            &payload.status_code,
            &credentials.merchant_secret,
            &payload.md5sig,
        );

        if !valid {
            warn!(
                merchant_id = %payload.merchant_id,
                payment_id = %payload.payment_id,
                "PayHere notification signature mismatch"
            );
            return Err(ServiceError::SignatureMismatch {
                order_id: payload.order_id.clone(),
            });
        }

        if payload.merchant_id != credentials.merchant_id {
            warn!(
                merchant_id = %payload.merchant_id,
                "signed notification names a different merchant id"
            );
        }

        Ok(VerifiedNotification {
            status: PaymentStatus::from_status_code(&payload.status_code),
            status_code: payload.status_code.clone(),
            order_id: payload.order_id.clone(),
            payment_id: payload.payment_id.clone(),
            amount: payload.payhere_amount.clone(),
            currency: payload.payhere_currency.clone(),
            method: payload.method.clone(),
            status_message: payload.status_message.clone(),
            custom_1: payload.custom_1.clone(),
            custom_2: payload.custom_2.clone(),
        })
    }
}
