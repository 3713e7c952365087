//! Error types for meeting AI operations.

use std::fmt;

/// Universal error type that abstracts provider-specific errors into common variants.
///
/// Provider implementations (Transcribe, Bedrock, S3, the skills API) map their native
/// SDK or HTTP errors into these variants so orchestration code can react to the
/// category of failure without knowing which vendor produced it.
#[derive(Debug)]
pub enum Error {
    /// Credentials were rejected or have expired (for example an invocation token).
    Authentication(String),

    /// Network connectivity issues, DNS failures, or connection timeouts.
    Network(String),

    /// Invalid parameters, missing required fields, or malformed configuration.
    Configuration(String),

    /// The provider accepted the request but reported a business-level failure
    /// (job rejected, model endpoint unknown, card update refused).
    Provider(String),

    /// Operation exceeded the configured or provider-enforced timeout period.
    Timeout(String),

    /// Requested resource (job, object, file) does not exist or is not yet visible.
    NotFound(String),

    /// A transcript token is missing required fields or is out of order.
    MalformedTranscript(String),

    /// Failed to serialize a request payload.
    Serialization(String),

    /// Failed to deserialize a provider response into the expected shape.
    Deserialization(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// True when the resource may simply not be visible yet and a later read could succeed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::MalformedTranscript(msg) => write!(f, "Malformed transcript: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            Error::Deserialization(err.to_string())
        } else {
            Error::Serialization(err.to_string())
        }
    }
}
