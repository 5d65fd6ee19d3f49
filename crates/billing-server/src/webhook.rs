//! Webhook signature verification and event dispatch

use crate::{BillingError, Result};
use hmac::{Hmac, Mac};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Maximum age of a signed payload, in seconds
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub object: Value,
}

impl WebhookEvent {
    fn object_id(&self) -> &str {
        self.data
            .object
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("?")
    }
}

/// Checks `t=<timestamp>,v1=<hex>` signatures over `"<timestamp>.<payload>"`
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn with_tolerance(mut self, secs: i64) -> Self {
        self.tolerance_secs = secs;
        self
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| BillingError::Internal(e.to_string()))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }

    /// Header value signing `payload` at `timestamp`
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String> {
        let signature = hex::encode(self.mac(timestamp, payload)?.finalize().into_bytes());
        Ok(format!("t={timestamp},v1={signature}"))
    }

    /// Verify the signature header and parse the event
    pub fn verify(&self, payload: &[u8], header: &str, now: i64) -> Result<WebhookEvent> {
        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
                Some(("v1", value)) => signatures.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| BillingError::InvalidSignature("missing timestamp".to_string()))?;
        if signatures.is_empty() {
            return Err(BillingError::InvalidSignature("missing v1 signature".to_string()));
        }
        if now.abs_diff(timestamp) > self.tolerance_secs.unsigned_abs() {
            return Err(BillingError::InvalidSignature(
                "timestamp outside tolerance".to_string(),
            ));
        }

        let mac = self.mac(timestamp, payload)?;
        let matched = signatures.iter().any(|sig| {
            hex::decode(sig)
                .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
                .unwrap_or(false)
        });
        if !matched {
            return Err(BillingError::InvalidSignature("signature mismatch".to_string()));
        }

        Ok(serde_json::from_slice(payload)?)
    }
}

/// Log a verified event; returns whether its type is handled
pub fn handle_event(event: &WebhookEvent) -> bool {
    match event.kind.as_str() {
        "checkout.session.completed" => {
            info!("checkout completed: {}", event.object_id());
        }
        "customer.subscription.updated" => {
            info!("subscription updated: {}", event.object_id());
        }
        "customer.subscription.deleted" => {
            info!("subscription deleted: {}", event.object_id());
        }
        "invoice.payment_failed" => {
            warn!("payment failed for invoice {}", event.object_id());
        }
        other => {
            debug!("ignoring event {} of type {other}", event.id);
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAYLOAD: &[u8] =
        br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"id":"cs_1"}}}"#;
    const NOW: i64 = 1_735_689_600;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new("whsec_test")
    }

    #[test]
    fn test_sign_then_verify() {
        let header = verifier().sign(PAYLOAD, NOW).unwrap();
        let event = verifier().verify(PAYLOAD, &header, NOW + 10).unwrap();

        assert_eq!(event.id, "evt_1");
        assert_eq!(event.kind, "checkout.session.completed");
        assert!(handle_event(&event));
    }

    #[test]
    fn test_known_signature() {
        let header = verifier().sign(b"{}", 0).unwrap();
        assert!(header.starts_with("t=0,v1="));
        assert_eq!(header.len(), "t=0,v1=".len() + 64);
    }

    #[test]
    fn test_wrong_secret() {
        let header = WebhookVerifier::new("other").sign(PAYLOAD, NOW).unwrap();
        assert!(matches!(
            verifier().verify(PAYLOAD, &header, NOW),
            Err(BillingError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_tampered_payload() {
        let header = verifier().sign(PAYLOAD, NOW).unwrap();
        let tampered = br#"{"id":"evt_2","type":"invoice.payment_failed"}"#;
        assert!(verifier().verify(tampered, &header, NOW).is_err());
    }

    #[test]
    fn test_expired_timestamp() {
        let header = verifier().sign(PAYLOAD, NOW).unwrap();
        assert!(verifier().verify(PAYLOAD, &header, NOW + 301).is_err());
        assert!(verifier()
            .with_tolerance(600)
            .verify(PAYLOAD, &header, NOW + 301)
            .is_ok());
    }

    #[test]
    fn test_malformed_header() {
        for header in ["", "t=abc,v1=00", "v1=00", "t=1735689600"] {
            assert!(matches!(
                verifier().verify(PAYLOAD, header, NOW),
                Err(BillingError::InvalidSignature(_))
            ));
        }
    }

    #[test]
    fn test_extreme_timestamps_are_rejected() {
        for header in ["t=-9223372036854775808,v1=00", "t=9223372036854775807,v1=00"] {
            assert!(matches!(
                verifier().verify(b"{}", header, NOW),
                Err(BillingError::InvalidSignature(_))
            ));
        }
    }

    #[test]
    fn test_any_v1_may_match() {
        let header = verifier().sign(PAYLOAD, NOW).unwrap();
        let header = header.replace(",v1=", ",v1=deadbeef,v1=");
        assert!(verifier().verify(PAYLOAD, &header, NOW).is_ok());
    }

    #[test]
    fn test_unhandled_event_type() {
        let event: WebhookEvent =
            serde_json::from_str(r#"{"id":"evt_3","type":"customer.created"}"#).unwrap();
        assert!(!handle_event(&event));
    }
}
