//! Standard Bearer token authentication.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

use super::ProviderAuth;
use crate::error::{token_error, Error, TokenErrorKind};

/// Standard Bearer token authentication.
///
/// Uses the standard `Authorization: Bearer <token>` header pattern.
pub struct BearerTokenAuth {
    provider_id: String,
    token: SecretString,
}

impl BearerTokenAuth {
    /// Create a new Bearer token authenticator.
    pub fn new(provider_id: &str, token: SecretString) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            token,
        }
    }
}

impl ProviderAuth for BearerTokenAuth {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn headers(&self) -> Result<HeaderMap, Error> {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {}", self.token.expose_secret())).map_err(
                |_| token_error(TokenErrorKind::InvalidFormat, "Token is not a valid header value"),
            )?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_auth_headers() {
        let auth = BearerTokenAuth::new("box", SecretString::new("test_token".to_string()));

        let headers = auth.headers().unwrap();
        let value = headers.get(AUTHORIZATION).unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer test_token");
        assert!(value.is_sensitive());
        assert_eq!(auth.provider_id(), "box");
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let auth = BearerTokenAuth::new("box", SecretString::new("bad\ntoken".to_string()));
        assert!(auth.headers().is_err());
    }
}
