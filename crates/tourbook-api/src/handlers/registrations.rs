// ============================================================================
// Tourbook API - Registration Handlers
// File: crates/tourbook-api/src/handlers/registrations.rs
// Description: Register to / withdraw from activities, "my activities"
// ============================================================================

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use tourbook_core::domain::{RegistrationOutcome, RegistrationStatus, WithdrawStatus};

use crate::error::ApiError;
use crate::handlers::{ActivityView, PageQuery};
use crate::middleware::{AuthenticatedUser, Session};
use crate::response::{ok, ApiResponse};
use crate::state::AppState;

const MSG_LOGIN_REQUIRED: &str = "Please log in or sign up to register to this activity.";

/// Handed to anonymous callers so the registration can resume after
/// login or sign-up.
#[derive(Debug, Serialize)]
pub struct ContinueRegistration {
    pub activity_id: Uuid,
    pub continuation_token: String,
}

/// POST /api/v1/activities/{id}/register
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Path(activity_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let Some(user) = session.user else {
        // 404 for unknown activities comes before the login prompt.
        state.catalog.show(&activity_id, None).await?;
        let continuation_token = state.accounts.continuation_for(&activity_id)?;
        info!("Anonymous registration attempt for activity {}", activity_id);
        return Ok(ApiResponse::error_with_data(
            "UNAUTHENTICATED",
            MSG_LOGIN_REQUIRED,
            ContinueRegistration { activity_id, continuation_token },
        )
        .with_status(StatusCode::UNAUTHORIZED));
    };

    let outcome = state.registrations.register_by_id(&user.id, &activity_id).await?;
    Ok(outcome_response(outcome))
}

fn outcome_response(outcome: RegistrationOutcome) -> Response {
    let message = outcome.message.clone();
    match outcome.status {
        RegistrationStatus::Success => ApiResponse::success(outcome).with_status(StatusCode::CREATED),
        RegistrationStatus::Conflict => ApiResponse::error_with_data("ALREADY_REGISTERED", &message, outcome)
            .with_status(StatusCode::CONFLICT),
        RegistrationStatus::Failure => ApiResponse::error_with_data("REGISTRATION_FAILED", &message, outcome)
            .with_status(StatusCode::SERVICE_UNAVAILABLE),
    }
}

/// GET /api/v1/my-activities?page=
pub async fn my_activities(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let page = state.catalog.my_activities(&user, query.pagination()).await?;
    Ok(ok(page.map(ActivityView::from)))
}

/// DELETE /api/v1/my-activities/{id}
pub async fn withdraw(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(activity_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let outcome = state.registrations.withdraw(&user.id, &activity_id).await?;
    match outcome.status {
        WithdrawStatus::Success => Ok(ok(outcome)),
        WithdrawStatus::NotRegistered => Err(ApiError::NotFound(outcome.message)),
    }
}
