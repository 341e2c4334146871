//! PostgreSQL repository implementations

pub mod user_repo_impl;
pub mod company_repo_impl;
pub mod activity_repo_impl;
pub mod registration_repo_impl;
pub mod invitation_repo_impl;

use std::sync::Arc;
use sqlx::PgPool;
use tracing::error;

use tourbook_core::error::DomainError;
use tourbook_core::repositories::Repositories;

pub use user_repo_impl::PgUserRepository;
pub use company_repo_impl::PgCompanyRepository;
pub use activity_repo_impl::PgActivityRepository;
pub use registration_repo_impl::{PgRegistrationRepository, PgRegistrationTransaction};
pub use invitation_repo_impl::PgInvitationRepository;

/// All PostgreSQL repositories over one pool.
pub struct PgStore;

impl PgStore {
    pub fn repositories(pool: PgPool) -> Repositories {
        Repositories {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            companies: Arc::new(PgCompanyRepository::new(pool.clone())),
            activities: Arc::new(PgActivityRepository::new(pool.clone())),
            registrations: Arc::new(PgRegistrationRepository::new(pool.clone())),
            invitations: Arc::new(PgInvitationRepository::new(pool)),
        }
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Logs the failure and hides the driver error behind `DatabaseError`.
pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e: sqlx::Error| {
        error!("Database error {}: {}", context, e);
        DomainError::DatabaseError(e.to_string())
    }
}
