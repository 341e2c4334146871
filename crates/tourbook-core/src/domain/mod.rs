//! # Tourbook Core - Domain Module
//! 
//! Domain entities for the booking application.

pub mod role;
pub mod user;
pub mod company;
pub mod money;
pub mod activity;
pub mod registration;
pub mod invitation;

// Re-export all entities and enums
pub use role::Role;
pub use user::User;
pub use company::Company;
pub use money::{Money, MoneyError};
pub use activity::{Activity, ActivityDraft};
pub use registration::{
    Participant, Registration, RegistrationNotice, RegistrationOutcome, RegistrationStatus,
    WithdrawOutcome, WithdrawStatus,
};
pub use invitation::RegistrationInvitation;
