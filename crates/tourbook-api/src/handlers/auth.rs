// ============================================================================
// Tourbook API - Auth Handlers
// File: crates/tourbook-api/src/handlers/auth.rs
// ============================================================================
//! Sign-up and login. Both accept `continuation_token` to resume an
//! activity registration started while anonymous.

use axum::{extract::State, response::Response, Json};

use tourbook_core::services::{Credentials, SignUp};

use crate::error::ApiError;
use crate::response::{created, ok};
use crate::state::AppState;

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<SignUp>,
) -> Result<Response, ApiError> {
    let session = state.accounts.register(payload).await?;
    Ok(created(session))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Response, ApiError> {
    let session = state.accounts.login(payload).await?;
    Ok(ok(session))
}
