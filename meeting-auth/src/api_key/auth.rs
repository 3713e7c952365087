//! Provider authentication trait.

use reqwest::header::HeaderMap;

use crate::error::Error;

/// Trait for producing the authentication headers a provider expects.
///
/// Implementations mark secret header values as sensitive so they never show up in
/// debug output of the request.
pub trait ProviderAuth: Send + Sync {
    /// Get the provider identifier.
    fn provider_id(&self) -> &str;

    /// Headers to attach to every request made with this credential.
    fn headers(&self) -> Result<HeaderMap, Error>;
}
