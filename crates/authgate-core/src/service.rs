//! Registration and login orchestration
//!
//! Ties the credential store, the hasher and the token issuer together.
//! Store calls are bounded by a timeout; Argon2 work runs on the blocking
//! pool so a burst of logins cannot starve the async runtime.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::claims::{Claims, DEFAULT_ROLE};
use crate::error::AuthError;
use crate::issuer::TokenIssuer;
use crate::jwt::SecretKey;
use crate::password::CredentialHasher;
use crate::store::{CredentialStore, StoreError};
use crate::verifier::TokenVerifier;

/// Default bound on a single credential store call
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Authentication service shared by all request handlers
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: CredentialHasher,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    store_timeout: Duration,
}

impl AuthService {
    /// Build a service around `store`
    ///
    /// `secret` is handed to both the issuer and the verifier. Passing `None`
    /// yields a service that fails closed on every token operation.
    pub fn new(store: Arc<dyn CredentialStore>, secret: Option<SecretKey>) -> Self {
        Self {
            store,
            hasher: CredentialHasher::default(),
            issuer: TokenIssuer::new(secret.clone()),
            verifier: TokenVerifier::new(secret),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_hasher(mut self, hasher: CredentialHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Derive the decoy digest up front so the first unknown-username login
    /// costs the same as every later one
    pub async fn warm_up(&self) -> Result<(), AuthError> {
        let hasher = self.hasher.clone();
        run_blocking(move || hasher.warm_up()).await
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Register a new account
    ///
    /// The existence check reports a taken username as `Conflict`; a
    /// duplicate that slips in between the check and the insert is reported
    /// the same way by the store.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        require_credentials(username, password)?;
        self.require_secret()?;

        match self.timed("get", self.store.get(username)).await {
            Ok(_) => return Err(AuthError::Conflict),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let hasher = self.hasher.clone();
        let plaintext = password.to_string();
        let digest = run_blocking(move || hasher.hash(&plaintext)).await??;

        self.timed("put", self.store.put(username, &digest)).await?;

        info!(username, "Registered user");
        Ok(())
    }

    /// Check credentials and issue an access token
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller, including in how long the call takes.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        require_credentials(username, password)?;
        self.require_secret()?;

        let stored = match self.timed("get", self.store.get(username)).await {
            Ok(hash) => Some(hash),
            Err(StoreError::NotFound) => None,
            Err(e) => return Err(e.into()),
        };

        let hasher = self.hasher.clone();
        let plaintext = password.to_string();
        let matched = run_blocking(move || match stored {
            Some(digest) => hasher.verify(&digest, &plaintext),
            None => {
                hasher.verify_decoy(&plaintext);
                false
            }
        })
        .await?;

        if !matched {
            debug!(username, "Login rejected");
            return Err(AuthError::Unauthorized);
        }

        let token = self.issuer.issue(username, DEFAULT_ROLE)?;
        info!(username, "User logged in");
        Ok(token)
    }

    /// Validate a bearer token
    pub fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        self.verifier.verify(token)
    }

    /// Probe the credential store under the usual timeout
    pub async fn check_store(&self) -> Result<(), AuthError> {
        self.timed("ping", self.store.ping()).await?;
        Ok(())
    }

    fn require_secret(&self) -> Result<(), AuthError> {
        if self.issuer.is_configured() {
            Ok(())
        } else {
            Err(AuthError::Config("JWT secret key is not set".to_string()))
        }
    }

    async fn timed<T, F>(&self, op: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = self.store_timeout.as_millis() as u64;
                warn!(op, timeout_ms, "Credential store call timed out");
                Err(StoreError::Transient(format!(
                    "{} timed out after {}ms",
                    op, timeout_ms
                )))
            }
        }
    }
}

fn require_credentials(username: &str, password: &str) -> Result<(), AuthError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(
            "Username and password are required".to_string(),
        ));
    }
    Ok(())
}

async fn run_blocking<T, F>(work: F) -> Result<T, AuthError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::Fatal(format!("Hashing task failed: {}", e)))
}
