//! Generative model provider trait.

use crate::Error;
use async_trait::async_trait;

/// Abstraction for a hosted model runtime that accepts an opaque JSON body.
///
/// The request and response shapes depend on the model family; see
/// [`crate::types::summarization::Request`] for building and reading them.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Invoke `model_id` with a serialized JSON request and return the raw response body.
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>)
        -> std::result::Result<Vec<u8>, Error>;

    /// Return unique identifier for this provider (e.g., "bedrock").
    fn provider_id(&self) -> &str;
}
