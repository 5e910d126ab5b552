use super::{signature, PayHereSettings};
use crate::errors::ServiceError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

/// Checkout request from the plan page.
///
/// Every field is optional on the wire so that a missing value is reported
/// as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Merchant order id, unique per payment attempt
    #[schema(example = "ORDER_1718000000000_k3j2h1g0f")]
    #[serde(default)]
    pub order_id: Option<String>,
    /// Amount to charge, as a JSON number or decimal string
    #[schema(value_type = Option<String>, example = "2400")]
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// ISO 4217 currency code
    #[schema(example = "LKR")]
    #[serde(default)]
    pub currency: Option<String>,
    #[schema(example = "pet-pharmacies")]
    #[serde(default)]
    pub plan_id: Option<String>,
    #[schema(example = "Pet Pharmacies")]
    #[serde(default)]
    pub plan_name: Option<String>,
}

/// Signed values the browser posts to the gateway checkout page.
///
/// `amount` and `hash` must be submitted exactly as returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub merchant_id: String,
    pub order_id: String,
    #[schema(example = "2400.00")]
    pub amount: String,
    pub currency: String,
    #[schema(example = "9662BDB1D0752D216351C08E9881BDD0")]
    pub hash: String,
    #[schema(example = "https://sandbox.payhere.lk/pay/checkout")]
    pub checkout_url: String,
}

/// Formats an amount with exactly two decimal places, rounding half away from zero.
///
/// Fails when the amount is too large to carry two decimal places.
pub fn format_amount(amount: Decimal) -> Result<String, ServiceError> {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    if rounded.scale() != 2 {
        return Err(ServiceError::ValidationError("amount is too large".into()));
    }
    Ok(rounded.to_string())
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ServiceError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::ValidationError(format!("{} is required", field))),
    }
}

/// Validates payment requests and signs checkout payloads.
#[derive(Debug, Clone)]
pub struct PaymentIntentBuilder {
    settings: Arc<PayHereSettings>,
}

impl PaymentIntentBuilder {
    pub fn new(settings: Arc<PayHereSettings>) -> Self {
        Self { settings }
    }

    /// Builds the checkout payload for a payment request.
    ///
    /// Nothing is persisted here; recording the attempt is up to the caller.
    #[instrument(skip(self, request), fields(order_id = request.order_id.as_deref().unwrap_or_default()))]
    pub fn create_payment(&self, request: &PaymentRequest) -> Result<CheckoutPayload, ServiceError> {
        let order_id = required(&request.order_id, "orderId")?;
        let currency = required(&request.currency, "currency")?;
        required(&request.plan_id, "planId")?;
        let amount = request
            .amount
            .ok_or_else(|| ServiceError::ValidationError("amount is required".into()))?;

        if amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "amount must be greater than 0".into(),
            ));
        }

        let formatted_amount = format_amount(amount)?;
        if formatted_amount.parse::<Decimal>().map_or(true, |v| v.is_zero()) {
            return Err(ServiceError::ValidationError(
                "amount rounds to 0.00".into(),
            ));
        }

        let credentials = self.settings.credentials()?;

        let hash = signature::compute_signature(
            &credentials.merchant_id,
            order_id,
            &formatted_amount,
            currency,
            &credentials.merchant_secret,
        );

        info!(
            amount = %formatted_amount,
            currency,
            mode = %self.settings.mode,
            "created PayHere checkout payload"
        );

        Ok(CheckoutPayload {
            merchant_id: credentials.merchant_id.clone(),
            order_id: order_id.to_string(),
            amount: formatted_amount,
            currency: currency.to_string(),
            hash,
            checkout_url: self.settings.checkout_url().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::payhere::{CheckoutMode, MerchantCredentials};
    use assert_matches::assert_matches;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn builder(mode: CheckoutMode) -> PaymentIntentBuilder {
        PaymentIntentBuilder::new(Arc::new(PayHereSettings::new(
            Some(MerchantCredentials::new("1211149", "SECRET")),
            mode,
        )))
    }

    fn request(amount: Decimal) -> PaymentRequest {
        PaymentRequest {
            order_id: Some("ORDER123".into()),
            amount: Some(amount),
            currency: Some("LKR".into()),
            plan_id: Some("pet-pharmacies".into()),
            plan_name: Some("Pet Pharmacies".into()),
        }
    }

    #[rstest]
    #[case(dec!(1000), "1000.00")]
    #[case(dec!(1000.0), "1000.00")]
    #[case(dec!(12.5), "12.50")]
    #[case(dec!(0.01), "0.01")]
    #[case(dec!(999.994), "999.99")]
    #[case(dec!(999.995), "1000.00")]
    #[case(dec!(0.005), "0.01")]
    #[case(dec!(2.675), "2.68")]
    #[case(dec!(10000.129), "10000.13")]
    fn amounts_are_formatted_to_two_places(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(format_amount(amount).unwrap(), expected);
    }

    #[test]
    fn creates_signed_sandbox_payload() {
        let payload = builder(CheckoutMode::Sandbox)
            .create_payment(&request(dec!(1000)))
            .unwrap();

        assert_eq!(
            payload,
            CheckoutPayload {
                merchant_id: "1211149".into(),
                order_id: "ORDER123".into(),
                amount: "1000.00".into(),
                currency: "LKR".into(),
                hash: "9662BDB1D0752D216351C08E9881BDD0".into(),
                checkout_url: "https://sandbox.payhere.lk/pay/checkout".into(),
            }
        );
    }

    #[test]
    fn production_mode_selects_live_endpoint() {
        let payload = builder(CheckoutMode::Production)
            .create_payment(&request(dec!(1000)))
            .unwrap();
        assert_eq!(payload.checkout_url, "https://www.payhere.lk/pay/checkout");
        assert_eq!(payload.hash, "9662BDB1D0752D216351C08E9881BDD0");
    }

    #[test]
    fn hash_covers_formatted_amount() {
        let payload = builder(CheckoutMode::Sandbox)
            .create_payment(&request(dec!(999.995)))
            .unwrap();
        assert_eq!(payload.amount, "1000.00");
        assert_eq!(
            payload.hash,
            signature::compute_signature("1211149", "ORDER123", "1000.00", "LKR", "SECRET")
        );
    }

    #[test]
    fn accepts_smallest_unit() {
        let payload = builder(CheckoutMode::Sandbox)
            .create_payment(&request(dec!(0.01)))
            .unwrap();
        assert_eq!(payload.amount, "0.01");
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    #[case(dec!(-0.01))]
    #[case(dec!(0.004))]
    fn rejects_non_positive_amounts(#[case] amount: Decimal) {
        assert_matches!(
            builder(CheckoutMode::Sandbox).create_payment(&request(amount)),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn rejects_missing_fields() {
        let b = builder(CheckoutMode::Sandbox);

        let mut missing_order = request(dec!(10));
        missing_order.order_id = None;
        assert_matches!(
            b.create_payment(&missing_order),
            Err(ServiceError::ValidationError(msg)) if msg.contains("orderId")
        );

        let mut blank_currency = request(dec!(10));
        blank_currency.currency = Some("  ".into());
        assert_matches!(
            b.create_payment(&blank_currency),
            Err(ServiceError::ValidationError(msg)) if msg.contains("currency")
        );

        let mut missing_plan = request(dec!(10));
        missing_plan.plan_id = Some(String::new());
        assert_matches!(
            b.create_payment(&missing_plan),
            Err(ServiceError::ValidationError(msg)) if msg.contains("planId")
        );

        let mut missing_amount = request(dec!(10));
        missing_amount.amount = None;
        assert_matches!(
            b.create_payment(&missing_amount),
            Err(ServiceError::ValidationError(msg)) if msg.contains("amount")
        );
    }

    #[test]
    fn amounts_without_room_for_cents_are_rejected() {
        assert_matches!(
            format_amount(Decimal::MAX),
            Err(ServiceError::ValidationError(msg)) if msg.contains("too large")
        );

        let huge: Decimal = "79228162514264337593543950335".parse().unwrap();
        assert_matches!(
            builder(CheckoutMode::Sandbox).create_payment(&request(huge)),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn plan_name_is_optional() {
        let mut req = request(dec!(10));
        req.plan_name = None;
        assert!(builder(CheckoutMode::Sandbox).create_payment(&req).is_ok());
    }

    #[test]
    fn missing_credentials_is_configuration_error() {
        let unconfigured = PaymentIntentBuilder::new(Arc::new(PayHereSettings::default()));
        assert_matches!(
            unconfigured.create_payment(&request(dec!(10))),
            Err(ServiceError::ConfigurationError(_))
        );
    }

    #[test]
    fn validation_runs_before_configuration_check() {
        let unconfigured = PaymentIntentBuilder::new(Arc::new(PayHereSettings::default()));
        assert_matches!(
            unconfigured.create_payment(&request(dec!(0))),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn request_accepts_numeric_and_string_amounts() {
        let numeric: PaymentRequest = serde_json::from_str(
            r#"{"orderId":"A","amount":2400,"currency":"LKR","planId":"p","planName":"P"}"#,
        )
        .unwrap();
        assert_eq!(numeric.amount, Some(dec!(2400)));

        let text: PaymentRequest =
            serde_json::from_str(r#"{"orderId":"A","amount":"999.995","currency":"LKR"}"#)
                .unwrap();
        assert_eq!(text.amount, Some(dec!(999.995)));
        assert_eq!(text.plan_id, None);
    }
}
