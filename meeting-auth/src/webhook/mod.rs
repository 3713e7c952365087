//! Webhook signature validation.

mod dual_key;

pub use dual_key::{sign, DualKeyWebhookValidator, MAX_DELIVERY_AGE_MINUTES};

use std::collections::HashMap;

use crate::error::Error;

/// Trait for validating webhook signatures.
pub trait WebhookValidator: Send + Sync {
    /// Validate a webhook request.
    ///
    /// # Arguments
    ///
    /// * `headers` - HTTP headers from the webhook request, keyed by lowercase name
    /// * `body` - Raw request body bytes
    ///
    /// # Returns
    ///
    /// `true` if signature is valid, `false` otherwise. Requests that cannot be
    /// checked at all (missing headers, stale delivery) are reported as errors.
    fn validate(&self, headers: &HashMap<String, String>, body: &[u8]) -> Result<bool, Error>;

    /// Get the provider identifier for this validator.
    fn provider_id(&self) -> &str;
}
