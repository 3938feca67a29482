//! Application state for the authgate API

use std::sync::Arc;

use anyhow::Result;
use authgate_core::AuthService;

use crate::config::Args;
use crate::store::SqliteStore;

/// Shared, read-only after startup
pub struct AppState {
    pub auth: AuthService,
}

impl AppState {
    /// Connect the credential store and wire up the auth service
    pub async fn new(args: &Args) -> Result<Self> {
        let store = SqliteStore::connect(
            &args.database_url,
            args.max_connections,
            args.store_timeout(),
        )
        .await?;

        let auth = AuthService::new(Arc::new(store), args.secret_key())
            .with_store_timeout(args.store_timeout());
        auth.warm_up().await?;

        Ok(Self::from_service(auth))
    }

    pub fn from_service(auth: AuthService) -> Self {
        Self { auth }
    }
}
