// ============================================================================
// Tourbook Core - Account Service
// File: crates/tourbook-core/src/services/account_service.rs
// Description: Sign-up (plain or by invitation), login, session resolution
// ============================================================================
//! Account service.
//!
//! Sign-up and login both accept an optional continuation token; when it is
//! valid, the pending activity registration is resumed for the fresh session
//! and its outcome is returned with the session.

use std::sync::Arc;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use tourbook_security::{InvitationToken, JwtError, JwtService, PasswordService};
use tourbook_shared::utils::{mask_email, normalize_email};

use crate::domain::{RegistrationInvitation, RegistrationOutcome, Role, User};
use crate::error::DomainError;
use crate::repositories::{InvitationRepository, UserRepository};
use crate::services::RegistrationService;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUp {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,

    pub invitation_token: Option<String>,
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub continuation_token: Option<String>,
}

/// A fresh session, plus the outcome of a resumed registration if any.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSession {
    pub user: User,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<RegistrationOutcome>,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    invitations: Arc<dyn InvitationRepository>,
    registrations: Arc<RegistrationService>,
    jwt: Arc<JwtService>,
    access_token_expiry: i64,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        invitations: Arc<dyn InvitationRepository>,
        registrations: Arc<RegistrationService>,
        jwt: Arc<JwtService>,
        access_token_expiry: i64,
    ) -> Self {
        Self {
            users,
            invitations,
            registrations,
            jwt,
            access_token_expiry,
        }
    }

    pub async fn register(&self, input: SignUp) -> Result<AccountSession, DomainError> {
        input.validate()?;
        let email = normalize_email(&input.email);
        info!("Sign-up attempt for: {}", mask_email(&email));

        // Reject a bad continuation before anything is written.
        let pending = self.pending_activity(input.continuation_token.as_deref())?;

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Sign-up failed, email exists: {}", mask_email(&email));
            return Err(DomainError::EmailAlreadyExists(email));
        }

        let invitation = match input.invitation_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Some(self.usable_invitation(token, &email).await?),
            _ => None,
        };
        let (role, company_id) = match &invitation {
            Some(inv) => (inv.role, Some(inv.company_id)),
            None => (Role::Customer, None),
        };

        let password_hash = PasswordService::hash(&input.password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;
        let user = User::new(input.name, email, password_hash, role, company_id)?;
        let user = self.users.create(&user).await?;

        if let Some(inv) = invitation {
            self.invitations.mark_registered(&inv.id, Utc::now()).await?;
            info!("Invitation {} consumed by user {}", inv.id, user.id);
        }

        info!("Sign-up successful: {} as {}", user.id, user.role.as_str());
        self.open_session(user, pending).await
    }

    pub async fn login(&self, input: Credentials) -> Result<AccountSession, DomainError> {
        input.validate()?;
        let email = normalize_email(&input.email);
        let pending = self.pending_activity(input.continuation_token.as_deref())?;

        let user = self.users.find_by_email(&email).await?.ok_or_else(|| {
            warn!("Login failed, unknown email: {}", mask_email(&email));
            DomainError::InvalidCredentials
        })?;

        let valid = PasswordService::verify(&input.password, &user.password)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !valid {
            warn!("Login failed, wrong password: {}", mask_email(&email));
            return Err(DomainError::InvalidCredentials);
        }

        info!("Login successful: {}", user.id);
        self.open_session(user, pending).await
    }

    /// Resolves a session token to its (non-deleted) user.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, DomainError> {
        let claims = self.jwt.validate_access_token(access_token).map_err(token_error)?;
        let user_id = claims.user_id().map_err(token_error)?;

        self.users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| DomainError::InvalidToken("unknown user".to_string()))
    }

    /// Token an anonymous caller presents at sign-up or login to resume
    /// registering to `activity_id`.
    pub fn continuation_for(&self, activity_id: &Uuid) -> Result<String, DomainError> {
        self.jwt
            .generate_continuation_token(activity_id)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))
    }

    fn pending_activity(&self, token: Option<&str>) -> Result<Option<Uuid>, DomainError> {
        match token.map(str::trim) {
            Some(token) if !token.is_empty() => self
                .jwt
                .validate_continuation_token(token)
                .map(Some)
                .map_err(token_error),
            _ => Ok(None),
        }
    }

    async fn usable_invitation(&self, token: &str, email: &str) -> Result<RegistrationInvitation, DomainError> {
        let invitation = self
            .invitations
            .find_pending_by_digest(&InvitationToken::digest(token))
            .await?
            .ok_or(DomainError::InvitationNotFound)?;

        if invitation.is_consumed() {
            return Err(DomainError::InvitationNotFound);
        }
        if !invitation.matches_email(email) {
            warn!("Invitation {} presented for a different email", invitation.id);
            return Err(DomainError::InvitationEmailMismatch);
        }
        Ok(invitation)
    }

    async fn open_session(&self, user: User, pending: Option<Uuid>) -> Result<AccountSession, DomainError> {
        let access_token = self
            .jwt
            .generate_access_token(&user.id, user.role.as_str())
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        let registration = match pending {
            Some(activity_id) => match self.registrations.register_by_id(&user.id, &activity_id).await {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    warn!("Pending registration to {} not resumed: {}", activity_id, e);
                    None
                }
            },
            None => None,
        };

        Ok(AccountSession {
            user,
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            registration,
        })
    }
}

fn token_error(e: JwtError) -> DomainError {
    DomainError::InvalidToken(e.to_string())
}
