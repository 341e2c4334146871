//! Outbound gateways other than the relational store.

pub mod notifier;
pub mod photo_storage;

pub use notifier::{InvitationMailer, Notifier};
pub use photo_storage::{PhotoStorage, PhotoUpload};
