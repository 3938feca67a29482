//! Identity claims carried inside a token

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned to every self-registered account
pub const DEFAULT_ROLE: &str = "user";

/// Claims embedded in an access token
///
/// The wire shape is exactly `{"username", "role", "exp"}`; any other field
/// makes the token malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    pub username: String,
    pub role: String,
    /// Expiration (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Expiry as a timestamp, `None` if `exp` is out of range
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// A token is expired from the second named in `exp` onwards
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}
