//! Activity repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use tourbook_shared::types::{Page, Pagination};
use crate::domain::Activity;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Activity>, DomainError>;
    /// Activities starting after `now`, soonest first.
    async fn list_upcoming(&self, now: DateTime<Utc>, pagination: Pagination) -> Result<Page<Activity>, DomainError>;
    async fn list_by_company(&self, company_id: &Uuid) -> Result<Vec<Activity>, DomainError>;
    async fn list_by_guide(&self, guide_id: &Uuid, pagination: Pagination) -> Result<Page<Activity>, DomainError>;
    /// Activities the user is registered to, ordered by start date.
    async fn list_for_participant(&self, user_id: &Uuid, pagination: Pagination) -> Result<Page<Activity>, DomainError>;
    async fn create(&self, activity: &Activity) -> Result<Activity, DomainError>;
    async fn update(&self, activity: &Activity) -> Result<Activity, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
