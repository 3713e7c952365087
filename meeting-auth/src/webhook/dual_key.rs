//! Dual-key HMAC-SHA256 webhook signature validation.
//!
//! The collaboration platform signs every delivery twice, once with each of two
//! rotating keys, so either key can be replaced without downtime. A delivery is
//! authentic when the signature made with either configured key matches.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::debug;

use super::WebhookValidator;
use crate::error::{webhook_error, Error, WebhookErrorKind};

type HmacSha256 = Hmac<Sha256>;

const TIMESTAMP_HEADER: &str = "box-delivery-timestamp";
const PRIMARY_SIGNATURE_HEADER: &str = "box-signature-primary";
const SECONDARY_SIGNATURE_HEADER: &str = "box-signature-secondary";
const VERSION_HEADER: &str = "box-signature-version";
const ALGORITHM_HEADER: &str = "box-signature-algorithm";

const SIGNATURE_VERSION: &str = "1";
const SIGNATURE_ALGORITHM: &str = "HmacSHA256";

/// Deliveries older than this are rejected to limit replay.
pub const MAX_DELIVERY_AGE_MINUTES: i64 = 10;

/// Validator for deliveries signed with a primary and a secondary key.
pub struct DualKeyWebhookValidator {
    provider_id: String,
    primary_key: SecretString,
    secondary_key: SecretString,
}

impl DualKeyWebhookValidator {
    /// Create a new dual-key validator.
    ///
    /// # Arguments
    ///
    /// * `provider_id` - Provider identifier
    /// * `primary_key` - Primary signing key
    /// * `secondary_key` - Secondary signing key
    pub fn new(provider_id: String, primary_key: SecretString, secondary_key: SecretString) -> Self {
        Self {
            provider_id,
            primary_key,
            secondary_key,
        }
    }

    /// Validate against an explicit clock reading.
    pub fn validate_at(
        &self,
        headers: &HashMap<String, String>,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let timestamp = headers.get(TIMESTAMP_HEADER).ok_or_else(|| {
            webhook_error(
                WebhookErrorKind::MissingSignature,
                &format!("Missing header: {}", TIMESTAMP_HEADER),
            )
        })?;

        let delivered_at = DateTime::parse_from_rfc3339(timestamp).map_err(|_| {
            webhook_error(
                WebhookErrorKind::InvalidPayload,
                "Delivery timestamp is not RFC 3339",
            )
        })?;
        if now > delivered_at.with_timezone(&Utc) + Duration::minutes(MAX_DELIVERY_AGE_MINUTES) {
            return Err(webhook_error(
                WebhookErrorKind::TimestampExpired,
                &format!("Delivery timestamp {} is too old", timestamp),
            ));
        }

        if headers.get(VERSION_HEADER).map(String::as_str) != Some(SIGNATURE_VERSION)
            || headers.get(ALGORITHM_HEADER).map(String::as_str) != Some(SIGNATURE_ALGORITHM)
        {
            return Err(webhook_error(
                WebhookErrorKind::UnsupportedScheme,
                "Unsupported signature version or algorithm",
            ));
        }

        let primary = headers.get(PRIMARY_SIGNATURE_HEADER);
        let secondary = headers.get(SECONDARY_SIGNATURE_HEADER);
        if primary.is_none() && secondary.is_none() {
            return Err(webhook_error(
                WebhookErrorKind::MissingSignature,
                "No signature headers present",
            ));
        }

        let matches = |signature: Option<&String>, key: &SecretString| match signature {
            Some(sig) => signature_matches(key, body, timestamp, sig),
            None => Ok(false),
        };

        if matches(primary, &self.primary_key)? || matches(secondary, &self.secondary_key)? {
            Ok(true)
        } else {
            debug!("Webhook signature mismatch for {}", self.provider_id);
            Ok(false)
        }
    }
}

/// Compute the base64 signature of `body ++ timestamp` under `key`.
pub fn sign(key: &str, body: &[u8], timestamp: &str) -> Result<String, Error> {
    let mac = new_mac(key.as_bytes(), body, timestamp)?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn new_mac(key: &[u8], body: &[u8], timestamp: &str) -> Result<HmacSha256, Error> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| webhook_error(WebhookErrorKind::InvalidPayload, "Invalid HMAC key"))?;
    mac.update(body);
    mac.update(timestamp.as_bytes());
    Ok(mac)
}

fn signature_matches(
    key: &SecretString,
    body: &[u8],
    timestamp: &str,
    signature: &str,
) -> Result<bool, Error> {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return Ok(false);
    };
    let mac = new_mac(key.expose_secret().as_bytes(), body, timestamp)?;
    Ok(mac.verify_slice(&expected).is_ok())
}

impl WebhookValidator for DualKeyWebhookValidator {
    fn validate(&self, headers: &HashMap<String, String>, body: &[u8]) -> Result<bool, Error> {
        self.validate_at(headers, body, Utc::now())
    }

    fn provider_id(&self) -> &str {
        &self.provider_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMARY: &str = "primary_secret";
    const SECONDARY: &str = "secondary_secret";
    const TIMESTAMP: &str = "2026-03-01T12:00:00-08:00";
    const BODY: &[u8] = br#"{"type":"skill_invocation","id":"inv-1"}"#;

    fn validator() -> DualKeyWebhookValidator {
        DualKeyWebhookValidator::new(
            "box".to_string(),
            SecretString::new(PRIMARY.to_string()),
            SecretString::new(SECONDARY.to_string()),
        )
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(TIMESTAMP)
            .unwrap()
            .with_timezone(&Utc)
            + Duration::minutes(1)
    }

    fn headers(primary: Option<String>, secondary: Option<String>) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert(TIMESTAMP_HEADER.to_string(), TIMESTAMP.to_string());
        headers.insert(VERSION_HEADER.to_string(), "1".to_string());
        headers.insert(ALGORITHM_HEADER.to_string(), "HmacSHA256".to_string());
        if let Some(sig) = primary {
            headers.insert(PRIMARY_SIGNATURE_HEADER.to_string(), sig);
        }
        if let Some(sig) = secondary {
            headers.insert(SECONDARY_SIGNATURE_HEADER.to_string(), sig);
        }
        headers
    }

    #[test]
    fn test_valid_primary_signature() {
        let headers = headers(Some(sign(PRIMARY, BODY, TIMESTAMP).unwrap()), None);
        assert!(validator().validate_at(&headers, BODY, now()).unwrap());
    }

    #[test]
    fn test_valid_secondary_signature_with_rotated_primary() {
        let headers = headers(
            Some(sign("retired_primary", BODY, TIMESTAMP).unwrap()),
            Some(sign(SECONDARY, BODY, TIMESTAMP).unwrap()),
        );
        assert!(validator().validate_at(&headers, BODY, now()).unwrap());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let headers = headers(
            Some(sign(PRIMARY, BODY, TIMESTAMP).unwrap()),
            Some(sign(SECONDARY, BODY, TIMESTAMP).unwrap()),
        );
        let tampered = br#"{"type":"skill_invocation","id":"inv-2"}"#;
        assert!(!validator().validate_at(&headers, tampered, now()).unwrap());
    }

    #[test]
    fn test_signature_for_other_timestamp_is_rejected() {
        let headers = headers(
            Some(sign(PRIMARY, BODY, "2026-03-01T11:59:00-08:00").unwrap()),
            None,
        );
        assert!(!validator().validate_at(&headers, BODY, now()).unwrap());
    }

    #[test]
    fn test_garbage_signature_is_rejected() {
        let headers = headers(Some("not base64 !!".to_string()), None);
        assert!(!validator().validate_at(&headers, BODY, now()).unwrap());
    }

    #[test]
    fn test_missing_signatures_is_an_error() {
        let result = validator().validate_at(&headers(None, None), BODY, now());
        assert_eq!(
            result.unwrap_err().error_kind,
            crate::ErrorKind::Webhook(WebhookErrorKind::MissingSignature)
        );
    }

    #[test]
    fn test_stale_delivery_is_an_error() {
        let headers = headers(Some(sign(PRIMARY, BODY, TIMESTAMP).unwrap()), None);
        let late = now() + Duration::minutes(MAX_DELIVERY_AGE_MINUTES);
        let result = validator().validate_at(&headers, BODY, late);
        assert_eq!(
            result.unwrap_err().error_kind,
            crate::ErrorKind::Webhook(WebhookErrorKind::TimestampExpired)
        );
    }

    #[test]
    fn test_unknown_signature_version_is_an_error() {
        let mut headers = headers(Some(sign(PRIMARY, BODY, TIMESTAMP).unwrap()), None);
        headers.insert(VERSION_HEADER.to_string(), "2".to_string());
        let result = validator().validate_at(&headers, BODY, now());
        assert_eq!(
            result.unwrap_err().error_kind,
            crate::ErrorKind::Webhook(WebhookErrorKind::UnsupportedScheme)
        );
    }
}
