//! # Tourbook Core
//! 
//! Domain entities, services, authorization policy and the repository /
//! gateway traits the infrastructure crate implements.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod ports;
pub mod policy;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
