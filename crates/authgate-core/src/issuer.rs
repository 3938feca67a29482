//! Access token issuance

use chrono::{DateTime, Duration, Utc};

use crate::claims::Claims;
use crate::error::AuthError;
use crate::jwt::{encode_jwt, SecretKey};

/// Access token lifetime in seconds (1 hour)
pub const ACCESS_TOKEN_TTL: i64 = 60 * 60;

/// Signs expiring access tokens with the process secret
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: Option<SecretKey>,
    ttl: Duration,
}

impl TokenIssuer {
    /// An issuer without a secret refuses to issue anything
    pub fn new(secret: Option<SecretKey>) -> Self {
        Self {
            secret,
            ttl: Duration::seconds(ACCESS_TOKEN_TTL),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `username` with `role`, expiring one TTL from now
    pub fn issue(&self, username: &str, role: &str) -> Result<String, AuthError> {
        self.issue_at(username, role, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        username: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let secret = self
            .secret
            .as_ref()
            .ok_or_else(|| AuthError::Config("JWT secret key is not set".to_string()))?;

        let claims = Claims {
            username: username.to_string(),
            role: role.to_string(),
            exp: (now + self.ttl).timestamp(),
        };

        encode_jwt(&claims, secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::TokenVerifier;

    fn secret() -> SecretKey {
        SecretKey::new("test-secret-key-at-least-32-bytes-long").unwrap()
    }

    #[test]
    fn test_issue_without_secret_fails_closed() {
        let issuer = TokenIssuer::new(None);
        assert!(!issuer.is_configured());
        assert!(matches!(
            issuer.issue("alice", "user"),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_expiry_is_one_hour_out() {
        let now = Utc::now();
        let token = TokenIssuer::new(Some(secret()))
            .issue_at("alice", "user", now)
            .unwrap();

        let claims = TokenVerifier::new(Some(secret()))
            .verify_at(&token, now)
            .unwrap();
        assert_eq!(claims.exp, now.timestamp() + ACCESS_TOKEN_TTL);
    }

    #[test]
    fn test_issued_tokens_are_distinct_per_identity() {
        let issuer = TokenIssuer::new(Some(secret()));
        let now = Utc::now();
        let a = issuer.issue_at("alice", "user", now).unwrap();
        let b = issuer.issue_at("bob", "user", now).unwrap();
        assert_ne!(a, b);
    }
}
