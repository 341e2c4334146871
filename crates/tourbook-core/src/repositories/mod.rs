//! Repository traits (ports)

pub mod user_repository;
pub mod company_repository;
pub mod activity_repository;
pub mod registration_repository;
pub mod invitation_repository;

use std::sync::Arc;

pub use user_repository::UserRepository;
pub use company_repository::CompanyRepository;
pub use activity_repository::ActivityRepository;
pub use registration_repository::{RegistrationRepository, RegistrationTransaction};
pub use invitation_repository::InvitationRepository;

/// Every repository the services need, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub companies: Arc<dyn CompanyRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub invitations: Arc<dyn InvitationRepository>,
}
