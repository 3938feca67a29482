//! Data models for the authgate API

use serde::{Deserialize, Serialize};

/// Body of `POST /register` and `POST /login`
///
/// Both fields are required; a body missing either is rejected before it
/// reaches a handler. Not `Debug`, so the password cannot end up in a log
/// line by accident.
#[derive(Clone, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response from a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Response from the protected route, echoing the verified identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedResponse {
    pub message: String,
    pub username: String,
    pub role: String,
}

/// Credential store probe result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub store: StoreHealth,
}
