//! Company repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::Company;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Company>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Company>, DomainError>;
    async fn list(&self) -> Result<Vec<Company>, DomainError>;
    async fn create(&self, company: &Company) -> Result<Company, DomainError>;
    async fn update(&self, company: &Company) -> Result<Company, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
