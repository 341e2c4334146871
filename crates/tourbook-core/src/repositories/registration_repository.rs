// ============================================================================
// Tourbook Core - Registration Repository
// File: crates/tourbook-core/src/repositories/registration_repository.rs
// Description: Port over the activity_user join table
// ============================================================================

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Participant, Registration};
use crate::error::DomainError;

/// Storage for user/activity associations.
///
/// Implementations must enforce uniqueness of `(user_id, activity_id)` in the
/// store itself: `exists` is only a fast path and two concurrent transactions
/// can both pass it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn exists(&self, user_id: &Uuid, activity_id: &Uuid) -> Result<bool, DomainError>;
    async fn begin(&self) -> Result<Box<dyn RegistrationTransaction>, DomainError>;
    /// Returns `false` when there was nothing to delete.
    async fn detach(&self, user_id: &Uuid, activity_id: &Uuid) -> Result<bool, DomainError>;
    async fn count_for_activity(&self, activity_id: &Uuid) -> Result<i64, DomainError>;
    /// Participants ordered by registration time.
    async fn participants(&self, activity_id: &Uuid) -> Result<Vec<Participant>, DomainError>;
}

/// Open write scope. Dropping it without `commit` discards its writes.
#[async_trait]
pub trait RegistrationTransaction: Send {
    /// Fails with `DomainError::AlreadyRegistered` on a uniqueness violation.
    async fn insert_association(&mut self, registration: &Registration) -> Result<(), DomainError>;
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}
