//! Public activity catalog

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::{ActivityView, PageQuery};
use crate::middleware::Session;
use crate::response::ok;
use crate::state::AppState;

/// GET /api/v1/activities?page=
pub async fn list_upcoming(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let page = state.catalog.upcoming(query.pagination()).await?;
    Ok(ok(page.map(ActivityView::from)))
}

/// GET /api/v1/activities/{id}
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(activity_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let details = state.catalog.show(&activity_id, session.user.as_ref()).await?;
    Ok(ok(details))
}
