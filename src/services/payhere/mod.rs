//! PayHere payment gateway integration.
//!
//! * [`signature`] computes and verifies the gateway's MD5 signatures.
//! * [`intents`] turns a payment request into a signed checkout payload.
//! * [`notifications`] authenticates server-to-server status callbacks.
//!
//! Everything here is synchronous and free of I/O. Credentials and the
//! checkout mode are passed in explicitly through [`PayHereSettings`].

pub mod intents;
pub mod notifications;
pub mod signature;

use crate::config::PayHereConfig;
use crate::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub use intents::{format_amount, CheckoutPayload, PaymentIntentBuilder, PaymentRequest};
pub use notifications::{
    NotificationPayload, NotificationVerifier, PaymentStatus, VerifiedNotification,
};

pub const PAYHERE_SANDBOX_URL: &str = "https://sandbox.payhere.lk/pay/checkout";
pub const PAYHERE_PRODUCTION_URL: &str = "https://www.payhere.lk/pay/checkout";

/// Merchant id and secret shared with the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct MerchantCredentials {
    pub merchant_id: String,
    pub merchant_secret: String,
}

impl MerchantCredentials {
    pub fn new(merchant_id: impl Into<String>, merchant_secret: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            merchant_secret: merchant_secret.into(),
        }
    }
}

impl fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("merchant_id", &self.merchant_id)
            .field("merchant_secret", &"<redacted>")
            .finish()
    }
}

/// Which checkout endpoint the browser form is posted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    #[default]
    Sandbox,
    Production,
}

impl CheckoutMode {
    /// Only an explicit `production` flag selects the live gateway.
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("production") {
            CheckoutMode::Production
        } else {
            CheckoutMode::Sandbox
        }
    }

    pub fn checkout_url(self) -> &'static str {
        match self {
            CheckoutMode::Sandbox => PAYHERE_SANDBOX_URL,
            CheckoutMode::Production => PAYHERE_PRODUCTION_URL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckoutMode::Sandbox => "sandbox",
            CheckoutMode::Production => "production",
        }
    }
}

impl fmt::Display for CheckoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway configuration handed to every payment operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayHereSettings {
    pub credentials: Option<MerchantCredentials>,
    pub mode: CheckoutMode,
}

impl PayHereSettings {
    pub fn new(credentials: Option<MerchantCredentials>, mode: CheckoutMode) -> Self {
        Self { credentials, mode }
    }

    /// Builds settings from configuration. Blank values count as missing.
    pub fn from_config(config: &PayHereConfig) -> Self {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        };

        let credentials = match (
            non_blank(&config.merchant_id),
            non_blank(&config.merchant_secret),
        ) {
            (Some(id), Some(secret)) => Some(MerchantCredentials::new(id, secret)),
            _ => None,
        };

        Self {
            credentials,
            mode: CheckoutMode::from_flag(&config.mode),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn checkout_url(&self) -> &'static str {
        self.mode.checkout_url()
    }

    pub fn credentials(&self) -> Result<&MerchantCredentials, ServiceError> {
        self.credentials.as_ref().ok_or_else(|| {
            ServiceError::ConfigurationError("PayHere merchant credentials are not configured".into())
        })
    }
}
