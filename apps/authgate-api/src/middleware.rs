//! Bearer token middleware for protected routes
//!
//! `require_bearer` runs before every protected handler. It either rejects
//! the request or stores the verified claims in the request extensions, where
//! the `CurrentUser` extractor picks them up. Handlers never look at the
//! `Authorization` header themselves.

use std::sync::Arc;

use authgate_core::{extract_bearer_token, Claims};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Identity of the caller, as proven by a verified bearer token
///
/// Lives only as long as the request it was attached to.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Claims);

/// Reject the request unless it carries a valid bearer token
///
/// A missing header or a scheme other than `Bearer ` is refused before the
/// verifier runs. A missing signing secret is a 500, not a 401.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = extract_bearer_token(header).ok_or(ApiError::Unauthorized)?;
    let claims = state.auth.authenticate(token)?;

    tracing::debug!(username = %claims.username, "Authenticated request");
    req.extensions_mut().insert(CurrentUser(claims));

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ApiError::Internal("Protected route mounted without require_bearer".into()))
    }
}
