//! Password hashing using Argon2id
//!
//! Digests are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! the salt and the work-cost factor travel with the digest and verification
//! needs nothing but the digest itself.

use std::sync::{Arc, OnceLock};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::AuthError;

/// Plaintext behind the decoy digest used for unknown usernames
const DECOY_PASSWORD: &str = "authgate-decoy-credential";

/// Salted, adaptive-cost password hasher
///
/// Clones share one decoy digest, so it is derived at most once per hasher
/// configuration no matter how many tasks hold a copy.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
    decoy: Arc<OnceLock<Option<String>>>,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
            decoy: Arc::default(),
        }
    }
}

impl CredentialHasher {
    /// Create a hasher with an explicit work cost
    ///
    /// # Arguments
    /// * `memory_kib` - Memory cost in KiB
    /// * `iterations` - Number of passes over memory
    /// * `parallelism` - Degree of parallelism
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::Config(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            params,
            decoy: Arc::default(),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt
    ///
    /// Fails only when the salt cannot be drawn or Argon2 cannot allocate its
    /// working memory. There is no weaker fallback.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Fatal(format!("Failed to hash password: {}", e)))
    }

    /// Verify a password against a stored digest
    ///
    /// The cost parameters are read from the digest, not from `self`, so
    /// digests written under an older cost keep verifying. Returns `false`
    /// for a mismatch and for an unparseable digest.
    pub fn verify(&self, digest: &str, password: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed_hash) => self
                .argon2()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Derive the decoy digest now instead of on the first unknown username
    pub fn warm_up(&self) {
        self.decoy_digest();
    }

    /// Spend the same work as a real verification, for unknown usernames
    pub fn verify_decoy(&self, password: &str) {
        if let Some(digest) = self.decoy_digest() {
            let _ = self.verify(digest, password);
        }
    }

    pub(crate) fn decoy_digest(&self) -> Option<&str> {
        self.decoy
            .get_or_init(|| self.hash(DECOY_PASSWORD).ok())
            .as_deref()
    }

    #[cfg(test)]
    pub(crate) fn cached_decoy(&self) -> Option<&str> {
        self.decoy.get().and_then(|digest| digest.as_deref())
    }
}
