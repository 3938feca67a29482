//! Compact JWS encoding pinned to HS256
//!
//! Tokens are `base64url(header).base64url(payload).base64url(signature)`
//! with the signature an HMAC-SHA256 over the first two segments. The header
//! is checked before anything else: a token whose header names any algorithm
//! other than HS256 is rejected without looking at its signature.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// The only algorithm this codec will produce or accept
pub const ALGORITHM: &str = "HS256";

/// Authorization scheme prefix, including the separating space
pub const BEARER_PREFIX: &str = "Bearer ";

/// Process-wide HMAC signing secret
///
/// Constructed once at startup and shared read-only by the issuer and the
/// verifier. An empty string is not a key.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Returns `None` for an empty secret
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            None
        } else {
            Some(Self(secret.into_bytes()))
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Why a token was refused
///
/// Only ever logged server-side. Callers see a single `Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    Format,
    Header,
    Algorithm,
    Signature,
    Payload,
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

impl Default for JwtHeader {
    fn default() -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        }
    }
}

fn mac_for(key: &SecretKey) -> Result<HmacSha256, AuthError> {
    HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| AuthError::Config(format!("HMAC key rejected: {}", e)))
}

/// Encode claims into a signed token
pub(crate) fn encode_jwt<T: Serialize>(claims: &T, key: &SecretKey) -> Result<String, AuthError> {
    let header_json = serde_json::to_vec(&JwtHeader::default())
        .map_err(|e| AuthError::Fatal(format!("Failed to encode token header: {}", e)))?;
    let payload_json = serde_json::to_vec(claims)
        .map_err(|e| AuthError::Fatal(format!("Failed to encode token claims: {}", e)))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(payload_json)
    );

    let mut mac = mac_for(key)?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();

    Ok(format!(
        "{}.{}",
        signing_input,
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Decode a token, checking header, then signature, then payload shape
///
/// Expiry is not checked here; that is the verifier's job.
pub(crate) fn decode_jwt<T: DeserializeOwned>(
    token: &str,
    key: &SecretKey,
) -> Result<T, Rejection> {
    let mut parts = token.split('.');
    let (header_b64, payload_b64, signature_b64) =
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(p), Some(s), None) if !h.is_empty() && !p.is_empty() && !s.is_empty() => {
                (h, p, s)
            }
            _ => return Err(Rejection::Format),
        };

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| Rejection::Header)?;
    let header: JwtHeader = serde_json::from_slice(&header_bytes).map_err(|_| Rejection::Header)?;

    if header.alg != ALGORITHM {
        return Err(Rejection::Algorithm);
    }
    if let Some(typ) = &header.typ {
        if !typ.eq_ignore_ascii_case("JWT") {
            return Err(Rejection::Header);
        }
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| Rejection::Signature)?;

    let mut mac = mac_for(key).map_err(|_| Rejection::Signature)?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(payload_b64.as_bytes());
    // Constant-time comparison
    mac.verify_slice(&signature)
        .map_err(|_| Rejection::Signature)?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| Rejection::Payload)?;
    serde_json::from_slice(&payload_bytes).map_err(|_| Rejection::Payload)
}

/// Extract the token from an `Authorization` header value
///
/// Returns `None` when the header is missing, uses another scheme, or
/// carries an empty token.
pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    auth_header
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
}
