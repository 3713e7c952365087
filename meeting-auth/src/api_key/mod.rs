//! Token authentication for service providers.
//!
//! Provides the [`ProviderAuth`] trait and a bearer-token implementation used for the
//! short-lived read and write tokens that arrive with each skill invocation.

mod auth;
mod bearer;

pub use auth::ProviderAuth;
pub use bearer::BearerTokenAuth;
