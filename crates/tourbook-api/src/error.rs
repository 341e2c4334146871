//! HTTP error type. Domain errors are mapped to status codes here; server
//! side failures are logged and replaced by a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use tourbook_core::error::DomainError;
use tourbook_shared::constants::{MSG_INVITATION_ALREADY_REQUESTED, MSG_INVITATION_EMAIL_MISMATCH};

use crate::response::ApiResponse;

const MSG_INTERNAL: &str = "Something went wrong. Please try again later.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UserNotFound
            | DomainError::CompanyNotFound
            | DomainError::ActivityNotFound
            | DomainError::MemberNotFound
            | DomainError::InvitationNotFound => ApiError::NotFound(e.to_string()),

            DomainError::EmailAlreadyExists(_)
            | DomainError::CompanyNameAlreadyExists(_)
            | DomainError::AlreadyRegistered => ApiError::Conflict(e.to_string()),

            DomainError::InvitationAlreadyRequested(_) => {
                ApiError::Validation(MSG_INVITATION_ALREADY_REQUESTED.to_string())
            }
            DomainError::InvitationEmailMismatch => {
                ApiError::Validation(MSG_INVITATION_EMAIL_MISMATCH.to_string())
            }
            DomainError::ValidationError(msg) => ApiError::Validation(msg),
            DomainError::InvalidToken(msg) => ApiError::Validation(format!("token: {}", msg)),

            DomainError::InvalidCredentials => ApiError::Unauthorized(e.to_string()),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),

            DomainError::NotificationError(msg) => ApiError::ServiceUnavailable(msg),

            DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::StorageError(_)
            | DomainError::DatabaseError(_)
            | DomainError::InternalError(_) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unauthorized(msg) => {
                warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
            }
            ApiError::Forbidden(msg) => {
                warn!("Forbidden: {}", msg);
                (
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "You are not allowed to perform this action.".to_string(),
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::ServiceUnavailable(msg) => {
                error!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", MSG_INTERNAL.to_string())
            }
            ApiError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", MSG_INTERNAL.to_string())
            }
        };

        ApiResponse::<()>::error(code, &message).with_status(status)
    }
}
