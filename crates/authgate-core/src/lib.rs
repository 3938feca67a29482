//! Authentication core for authgate
//!
//! This crate provides the security-sensitive parts of the service:
//! Argon2id password hashing, stateless HS256 access tokens, and the
//! registration/login flow over an abstract credential store.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use authgate_core::{AuthService, MemoryStore, SecretKey};
//!
//! # async fn demo() -> Result<(), authgate_core::AuthError> {
//! let service = AuthService::new(Arc::new(MemoryStore::new()), SecretKey::new("change-me"));
//! service.register("alice", "s3cret").await?;
//! let token = service.login("alice", "s3cret").await?;
//! let claims = service.authenticate(&token)?;
//! assert_eq!(claims.username, "alice");
//! # Ok(())
//! # }
//! ```

pub mod claims;
pub mod error;
pub mod issuer;
pub mod jwt;
pub mod password;
pub mod service;
pub mod store;
pub mod verifier;

pub use claims::{Claims, DEFAULT_ROLE};
pub use error::AuthError;
pub use issuer::{TokenIssuer, ACCESS_TOKEN_TTL};
pub use jwt::{extract_bearer_token, SecretKey};
pub use password::CredentialHasher;
pub use service::{AuthService, DEFAULT_STORE_TIMEOUT};
pub use store::{CredentialStore, MemoryStore, StoreError};
pub use verifier::TokenVerifier;
