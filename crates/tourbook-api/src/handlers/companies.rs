//! Company administration (administrators only).

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::response::{created, ok};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompanyPayload {
    pub name: String,
}

pub async fn list(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Response, ApiError> {
    Ok(ok(state.companies.list(&user).await?))
}

pub async fn get(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(company_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(ok(state.companies.get(&user, &company_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CompanyPayload>,
) -> Result<Response, ApiError> {
    let company = state.companies.create(&user, &payload.name).await?;
    Ok(created(company))
}

pub async fn update(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CompanyPayload>,
) -> Result<Response, ApiError> {
    let company = state.companies.rename(&user, &company_id, &payload.name).await?;
    Ok(ok(company))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(company_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state.companies.delete(&user, &company_id).await?;
    Ok(ok(serde_json::json!({ "deleted": company_id })))
}
