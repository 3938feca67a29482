//! Error types for the authgate API

use authgate_core::AuthError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("User already exists")]
    Conflict,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server misconfigured: {0}")]
    Config(String),

    #[error("Service temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => ApiError::InvalidRequest(msg),
            AuthError::Conflict => ApiError::Conflict,
            AuthError::Unauthorized => ApiError::Unauthorized,
            AuthError::Config(msg) => ApiError::Config(msg),
            AuthError::Transient(msg) => ApiError::Unavailable(msg),
            AuthError::Fatal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        ApiError::InvalidRequest("Invalid request body".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict => (StatusCode::CONFLICT, "User already exists".to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Config(detail) => {
                tracing::error!("Configuration error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Unavailable(detail) => {
                tracing::warn!("Transient failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Service temporarily unavailable, please retry".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let cases = [
            (AuthError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::Conflict, StatusCode::CONFLICT),
            (AuthError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AuthError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::Transient("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::Fatal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let (status, body) = render(err.into()).await;
            assert_eq!(status, expected);
            assert_eq!(body["status"], expected.as_u16());
        }
    }

    #[tokio::test]
    async fn test_internal_detail_is_not_leaked() {
        let (_, body) = render(ApiError::Internal("table users: disk I/O error".into())).await;
        assert_eq!(body["error"], "Internal server error");

        let (_, body) = render(ApiError::Config("JWT secret key is not set".into())).await;
        assert_eq!(body["error"], "Internal server error");

        let (_, body) = render(ApiError::Unavailable("get timed out after 5000ms".into())).await;
        assert!(!body["error"].as_str().unwrap().contains("5000"));
    }
}
