//! Credential store interface
//!
//! The store maps `username -> password hash` and owns its own consistency:
//! `put` must refuse a username that already exists, even when two
//! registrations race.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username already exists")]
    Conflict,

    #[error("Username not found")]
    NotFound,

    #[error("Store temporarily unavailable: {0}")]
    Transient(String),

    #[error("Store failure: {0}")]
    Fatal(String),
}

/// Persistence for credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new credential, failing with `Conflict` if the username exists
    async fn put(&self, username: &str, password_hash: &str) -> Result<(), StoreError>;

    /// Fetch the password hash for `username`, failing with `NotFound`
    async fn get(&self, username: &str) -> Result<String, StoreError>;

    /// Cheap round trip used by health checks
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Process-local store, used by tests and for running without a database
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn put(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        match self.users.write().await.entry(username.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(password_hash.to_string());
                Ok(())
            }
        }
    }

    async fn get(&self, username: &str) -> Result<String, StoreError> {
        self.users
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}
