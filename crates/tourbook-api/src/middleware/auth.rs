// ============================================================================
// Tourbook API - Session Middleware
// File: crates/tourbook-api/src/middleware/auth.rs
// Description: Resolves the bearer token into the request's Session
// ============================================================================

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use tourbook_core::domain::User;

use crate::error::ApiError;
use crate::state::AppState;

/// Who is calling. Present on every request that went through
/// [`session_middleware`]; `user` is `None` for anonymous callers.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<User>,
}

/// A request without a bearer token is anonymous. A token that does not
/// resolve to a live user is rejected with 401.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());

    let user = match token {
        Some(token) => {
            let user = state
                .accounts
                .authenticate(&token)
                .await
                .map_err(|e| ApiError::Unauthorized(e.to_string()))?;
            debug!("Request by user {}", user.id);
            Some(user)
        }
        None => None,
    };

    request.extensions_mut().insert(Session { user });
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Session>().cloned().unwrap_or_default())
    }
}

/// Extractor for handlers that need a logged-in user.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .and_then(|session| session.user.clone())
            .map(AuthenticatedUser)
            .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))
    }
}
