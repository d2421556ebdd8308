//! Request signing for the Zota API.
//!
//! Every request is authenticated by a SHA-256 digest over a fixed
//! concatenation of request fields followed by the merchant secret key. The
//! fields are joined without delimiters, so the exact string form of each
//! field (amounts in particular) must match what the gateway computes.

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 over the concatenation of `parts`, in order.
pub fn sign(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// `endpointID + merchantOrderID + orderAmount + customerEmail + secretKey`
pub fn deposit_signature(
    endpoint_id: &str,
    merchant_order_id: &str,
    order_amount: &str,
    customer_email: &str,
    secret_key: &str,
) -> String {
    sign(&[
        endpoint_id,
        merchant_order_id,
        order_amount,
        customer_email,
        secret_key,
    ])
}

/// `merchantID + merchantOrderID + orderID + timestamp + secretKey`
pub fn order_status_signature(
    merchant_id: &str,
    merchant_order_id: &str,
    order_id: &str,
    timestamp: i64,
    secret_key: &str,
) -> String {
    let timestamp = timestamp.to_string();
    sign(&[
        merchant_id,
        merchant_order_id,
        order_id,
        &timestamp,
        secret_key,
    ])
}

/// Shortest plain decimal form of `amount`: no trailing zeros, no exponent.
pub fn format_amount(amount: &Decimal) -> String {
    amount.normalize().to_string()
}
