//! User repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Role, User};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Soft-deleted users are not returned.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn list_by_company_and_role(&self, company_id: &Uuid, role: Role) -> Result<Vec<User>, DomainError>;
    async fn create(&self, user: &User) -> Result<User, DomainError>;
    async fn update(&self, user: &User) -> Result<User, DomainError>;
    async fn soft_delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
