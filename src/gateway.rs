use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const RAZORPAY_BASE_URL: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A payment order created on the remote gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    /// Amount in the smallest currency unit (paise).
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    payment_capture: u8,
}

/// Adapter for the Razorpay orders API. Constructed only when credentials
/// are configured; callers fall back to placeholder identifiers otherwise.
#[derive(Clone)]
pub struct RazorpayGateway {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    base_url: String,
}

impl RazorpayGateway {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id,
            key_secret,
            base_url: RAZORPAY_BASE_URL.to_string(),
        }
    }

    /// Create a remote payment order. `amount` is in whole currency units;
    /// the gateway expects paise.
    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let body = CreateOrderBody {
            amount: amount * 100,
            currency,
            receipt,
            payment_capture: 1,
        };
        let order = self
            .http
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<GatewayOrder>()
            .await?;
        Ok(order)
    }
}

/// Hex-encoded HMAC-SHA256 over `order_id|payment_id`, as the gateway signs
/// its payment callbacks.
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a client-supplied signature. Malformed hex is a
/// mismatch, not an error.
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&provided).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trip_verifies() {
        let secret = "test_secret";
        let sig = payment_signature(secret, "order_abc", "pay_xyz");
        assert!(verify_signature(secret, "order_abc", "pay_xyz", &sig));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let secret = "test_secret";
        let sig = payment_signature(secret, "order_abc", "pay_xyz");
        assert!(!verify_signature(secret, "order_abc", "pay_other", &sig));
        assert!(!verify_signature("other_secret", "order_abc", "pay_xyz", &sig));
    }

    #[test]
    fn malformed_hex_is_a_mismatch() {
        assert!(!verify_signature("s", "o", "p", "not-hex"));
        assert!(!verify_signature("s", "o", "p", ""));
    }
}
