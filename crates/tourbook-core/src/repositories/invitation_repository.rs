//! Invitation repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::RegistrationInvitation;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<RegistrationInvitation>, DomainError>;
    /// Unconsumed invitation with the given token digest.
    async fn find_pending_by_digest(&self, digest: &str) -> Result<Option<RegistrationInvitation>, DomainError>;
    async fn create(&self, invitation: &RegistrationInvitation) -> Result<RegistrationInvitation, DomainError>;
    async fn mark_registered(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
