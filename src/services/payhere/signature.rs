//! PayHere merchant signatures.
//!
//! The gateway uses two MD5 based formulas:
//!
//! * checkout (outbound): `UPPER(MD5(merchant_id + order_id + amount + currency + UPPER(MD5(secret))))`
//! * notification (inbound): `UPPER(MD5(merchant_id + order_id + amount + currency + status_code + secret))`
//!
//! The outbound path first normalizes the merchant secret, which dashboards
//! may export base64 encoded. The inbound path uses the secret exactly as
//! configured.

use base64::{
    alphabet,
    engine::{general_purpose::GeneralPurpose, DecodePaddingMode, GeneralPurposeConfig},
    Engine as _,
};
use md5::{Digest, Md5};
use std::string::FromUtf8Error;
use thiserror::Error;
use tracing::debug;

/// Standard alphabet, padding optional. Trailing `=` is stripped before decoding.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons a merchant secret could not be treated as base64 text.
#[derive(Debug, Error)]
pub enum SecretDecodeError {
    #[error("not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded bytes are not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error("decoded secret is empty")]
    Empty,

    #[error("decoded secret contains control characters")]
    ControlCharacters,
}

/// Decodes a base64 merchant secret into text.
pub fn try_decode_base64(secret: &str) -> Result<String, SecretDecodeError> {
    let bytes = LENIENT_STANDARD.decode(secret)?;
    if bytes.is_empty() {
        return Err(SecretDecodeError::Empty);
    }

    let decoded = String::from_utf8(bytes)?;
    if decoded.chars().any(char::is_control) {
        return Err(SecretDecodeError::ControlCharacters);
    }

    Ok(decoded)
}

/// Normalizes a merchant secret for the checkout hash.
///
/// Trailing `:` and `=` characters are stripped, then the remainder is decoded
/// as base64. When decoding fails the stripped value is used as a plain secret.
pub fn normalize_outbound_secret(secret: &str) -> String {
    let stripped = secret.trim_end_matches(|c| c == ':' || c == '=');

    match try_decode_base64(stripped) {
        Ok(decoded) => decoded,
        Err(err) => {
            debug!(reason = %err, "merchant secret is not base64, using it as plain text");
            stripped.to_string()
        }
    }
}

/// Uppercase hex MD5 digest.
pub fn md5_upper_hex(input: &str) -> String {
    hex::encode_upper(Md5::digest(input.as_bytes()))
}

/// Computes the checkout hash sent to the gateway with the payment form.
///
/// `amount` must already be formatted with exactly two decimal places; the
/// gateway recomputes the hash from the submitted form field.
pub fn compute_signature(
    merchant_id: &str,
    order_id: &str,
    amount: &str,
    currency: &str,
    secret: &str,
) -> String {
    let secret = normalize_outbound_secret(secret);
    let secret_hash = md5_upper_hex(&secret);

    md5_upper_hex(&format!(
        "{}{}{}{}{}",
        merchant_id, order_id, amount, currency, secret_hash
    ))
}

/// Signature the gateway attaches to a server-to-server notification (`md5sig`).
pub fn notification_signature(
    merchant_id: &str,
    order_id: &str,
    amount: &str,
    currency: &str,
    status_code: &str,
    secret: &str,
) -> String {
    md5_upper_hex(&format!(
        "{}{}{}{}{}{}",
        merchant_id, order_id, amount, currency, status_code, secret
    ))
}

/// Checks a notification signature. The claimed value is compared after
/// uppercasing, so lowercase hex from the gateway is accepted.
pub fn verify_signature(
    merchant_id: &str,
    order_id: &str,
    amount: &str,
    currency: &str,
    status_code: &str,
    secret: &str,
    claimed_signature: &str,
) -> bool {
    let expected =
        notification_signature(merchant_id, order_id, amount, currency, status_code, secret);
    constant_time_eq(&expected, &claimed_signature.to_ascii_uppercase())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        res |= x ^ y;
    }
    res == 0
}
