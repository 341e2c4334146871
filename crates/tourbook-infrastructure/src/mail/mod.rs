//! Outbound mail: templates, transports and the delivery queue.

pub mod templates;
pub mod transport;
pub mod queue;

pub use templates::MailTemplates;
pub use transport::{LogTransport, MailError, MailTransport, OutgoingMail, SmtpTransport};
pub use queue::{MailQueueConfig, QueuedNotifier};
