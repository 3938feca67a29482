//! Error taxonomy for the authentication core
//!
//! Every failure the core can produce collapses into one of these variants.
//! The HTTP layer maps them onto status codes; only `Validation` carries a
//! message that is safe to echo back to a client.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or missing input (400)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Username already registered (409)
    #[error("User already exists")]
    Conflict,

    /// Bad credentials or an invalid, expired or malformed token (401).
    ///
    /// Deliberately carries no detail.
    #[error("Unauthorized")]
    Unauthorized,

    /// Signing secret missing or unusable (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store timed out or was temporarily unreachable (500, retryable)
    #[error("Transient failure: {0}")]
    Transient(String),

    /// Unexpected store or hashing failure (500)
    #[error("Internal failure: {0}")]
    Fatal(String),
}

impl AuthError {
    /// True when the failure is the server's fault rather than the caller's
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AuthError::Config(_) | AuthError::Transient(_) | AuthError::Fatal(_)
        )
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AuthError::Conflict,
            // Callers that care about absence match on NotFound before converting
            StoreError::NotFound => AuthError::Unauthorized,
            StoreError::Transient(msg) => AuthError::Transient(msg),
            StoreError::Fatal(msg) => AuthError::Fatal(msg),
        }
    }
}
