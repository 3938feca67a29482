//! Access token verification
//!
//! Checks run in a fixed order: secret present, token shape, algorithm,
//! signature, claim shape, expiry. Every failure after the first collapses to
//! `AuthError::Unauthorized`; the concrete reason is only logged at debug.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::claims::Claims;
use crate::error::AuthError;
use crate::jwt::{decode_jwt, Rejection, SecretKey};

/// Validates access tokens against the process secret
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    secret: Option<SecretKey>,
}

impl TokenVerifier {
    /// A verifier without a secret rejects every call with a config error
    pub fn new(secret: Option<SecretKey>) -> Self {
        Self { secret }
    }

    /// Verify `token` and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub(crate) fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let secret = self
            .secret
            .as_ref()
            .ok_or_else(|| AuthError::Config("JWT secret key is not set".to_string()))?;

        check(token, secret, now).map_err(|reason| {
            debug!(?reason, "Rejected access token");
            AuthError::Unauthorized
        })
    }
}

fn check(token: &str, secret: &SecretKey, now: DateTime<Utc>) -> Result<Claims, Rejection> {
    let claims: Claims = decode_jwt(token, secret)?;

    if claims.is_expired_at(now) {
        return Err(Rejection::Expired);
    }

    Ok(claims)
}
