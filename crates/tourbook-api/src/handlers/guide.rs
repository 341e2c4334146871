//! Guide views: assigned activities and their participants.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::{ActivityView, PageQuery};
use crate::middleware::AuthenticatedUser;
use crate::response::ok;
use crate::state::AppState;

/// GET /api/v1/guide/activities?page=
pub async fn activities(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let page = state.catalog.guide_activities(&user, query.pagination()).await?;
    Ok(ok(page.map(ActivityView::from)))
}

/// GET /api/v1/guide/activities/{id}/participants
pub async fn participants(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(activity_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let participants = state.catalog.participants(&user, &activity_id).await?;
    Ok(ok(participants))
}
