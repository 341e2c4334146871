//! Domain errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found")]
    UserNotFound,

    #[error("Company not found")]
    CompanyNotFound,

    #[error("Activity not found")]
    ActivityNotFound,

    #[error("Company member not found")]
    MemberNotFound,

    #[error("Invitation not found")]
    InvitationNotFound,

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Company name already exists: {0}")]
    CompanyNameAlreadyExists(String),

    #[error("Invitation already requested for: {0}")]
    InvitationAlreadyRequested(String),

    #[error("Invitation does not match email")]
    InvitationEmailMismatch,

    #[error("User already registered to activity")]
    AlreadyRegistered,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Notification error: {0}")]
    NotificationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}
