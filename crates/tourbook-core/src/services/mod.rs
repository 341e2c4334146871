//! Domain services (business logic)

pub mod registration_service;
pub mod catalog_service;
pub mod company_service;
pub mod member_service;
pub mod company_activity_service;
pub mod account_service;

pub use registration_service::RegistrationService;
pub use catalog_service::{ActivityDetails, CatalogService, GuideContact};
pub use company_service::CompanyService;
pub use member_service::{MemberKind, MemberService};
pub use company_activity_service::CompanyActivityService;
pub use account_service::{AccountService, AccountSession, Credentials, SignUp};
