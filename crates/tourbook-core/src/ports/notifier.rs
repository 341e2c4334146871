//! Notification gateways

use async_trait::async_trait;
use crate::domain::{RegistrationInvitation, RegistrationNotice, User};
use crate::error::DomainError;

/// Delivers the "registration confirmed" message to a user.
///
/// May deliver synchronously or only enqueue. Either way an `Err` means the
/// message will not go out, and the registration is rolled back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &User, notice: &RegistrationNotice) -> Result<(), DomainError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationMailer: Send + Sync {
    async fn send_invitation(&self, invitation: &RegistrationInvitation, invite_url: &str) -> Result<(), DomainError>;
}
