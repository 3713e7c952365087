//! # meeting-auth
//!
//! Authentication plumbing shared by the skill service:
//! - Bearer token authentication for per-invocation platform tokens
//! - HTTP client building with retry middleware
//! - Dual-key webhook signature validation for inbound skill events
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meeting_auth::{
//!     api_key::BearerTokenAuth,
//!     http::AuthenticatedClientBuilder,
//!     webhook::{DualKeyWebhookValidator, WebhookValidator},
//! };
//! ```

pub mod api_key;
pub mod error;
pub mod http;
pub mod webhook;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
