//! # Tourbook Infrastructure
//! 
//! Adapters for the core ports: PostgreSQL and in-memory stores, the
//! queued mail notifier and local photo storage.

pub mod database;
pub mod memory;
pub mod mail;
pub mod storage;

pub use database::{create_pool, run_migrations, PgStore};
pub use memory::MemoryStore;
pub use mail::{LogTransport, MailTransport, QueuedNotifier, SmtpTransport};
pub use storage::LocalPhotoStorage;
