//! HTTP handlers for the authgate API

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::*;
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello World".to_string(),
    })
}

/// GET /health
///
/// 200 while the credential store answers, 503 otherwise.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let probe = state.auth.check_store().await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let (status, store) = match probe {
        Ok(()) => (
            StatusCode::OK,
            StoreHealth {
                status: "up".to_string(),
                message: None,
                latency_ms,
            },
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                StoreHealth {
                    status: "down".to_string(),
                    message: Some("Credential store unreachable".to_string()),
                    latency_ms,
                },
            )
        }
    };

    let body = HealthResponse {
        status: store.status.clone(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store,
    };

    (status, Json(body))
}

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(req) = payload?;

    state.auth.register(&req.username, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(req) = payload?;

    let token = state.auth.login(&req.username, &req.password).await?;

    Ok(Json(TokenResponse { token }))
}

/// GET /protected
pub async fn protected(CurrentUser(claims): CurrentUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "Welcome to the protected route".to_string(),
        username: claims.username,
        role: claims.role,
    })
}
