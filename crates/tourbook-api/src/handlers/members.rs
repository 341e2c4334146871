// ============================================================================
// Tourbook API - Company Member Handlers
// File: crates/tourbook-api/src/handlers/members.rs
// Description: Owners under /companies/{id}/users, guides under
//              /companies/{id}/guides
// ============================================================================

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use tourbook_core::services::MemberKind;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::response::{created, ok};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InvitePayload {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct MemberPayload {
    pub name: String,
    pub email: String,
}

async fn list(state: AppState, user: AuthenticatedUser, company_id: Uuid, kind: MemberKind) -> Result<Response, ApiError> {
    let members = state.members.list(&user.0, &company_id, kind).await?;
    Ok(ok(members))
}

async fn invite(
    state: AppState,
    user: AuthenticatedUser,
    company_id: Uuid,
    kind: MemberKind,
    payload: InvitePayload,
) -> Result<Response, ApiError> {
    let invitation = state.members.invite(&user.0, &company_id, kind, &payload.email).await?;
    Ok(created(invitation))
}

async fn update(
    state: AppState,
    user: AuthenticatedUser,
    (company_id, member_id): (Uuid, Uuid),
    kind: MemberKind,
    payload: MemberPayload,
) -> Result<Response, ApiError> {
    let member = state
        .members
        .update(&user.0, &company_id, kind, &member_id, &payload.name, &payload.email)
        .await?;
    Ok(ok(member))
}

async fn remove(
    state: AppState,
    user: AuthenticatedUser,
    (company_id, member_id): (Uuid, Uuid),
    kind: MemberKind,
) -> Result<Response, ApiError> {
    state.members.remove(&user.0, &company_id, kind, &member_id).await?;
    Ok(ok(serde_json::json!({ "deleted": member_id })))
}

pub async fn list_owners(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(company_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    list(state, user, company_id, MemberKind::Owners).await
}

pub async fn invite_owner(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<InvitePayload>,
) -> Result<Response, ApiError> {
    invite(state, user, company_id, MemberKind::Owners, payload).await
}

pub async fn update_owner(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(ids): Path<(Uuid, Uuid)>,
    Json(payload): Json<MemberPayload>,
) -> Result<Response, ApiError> {
    update(state, user, ids, MemberKind::Owners, payload).await
}

pub async fn remove_owner(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(ids): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    remove(state, user, ids, MemberKind::Owners).await
}

pub async fn list_guides(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(company_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    list(state, user, company_id, MemberKind::Guides).await
}

pub async fn invite_guide(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<InvitePayload>,
) -> Result<Response, ApiError> {
    invite(state, user, company_id, MemberKind::Guides, payload).await
}

pub async fn update_guide(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(ids): Path<(Uuid, Uuid)>,
    Json(payload): Json<MemberPayload>,
) -> Result<Response, ApiError> {
    update(state, user, ids, MemberKind::Guides, payload).await
}

pub async fn remove_guide(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(ids): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    remove(state, user, ids, MemberKind::Guides).await
}
