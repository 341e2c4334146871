// ============================================================================
// Tourbook Infrastructure - Queued Notifier
// File: crates/tourbook-infrastructure/src/mail/queue.rs
// Description: Bounded mail queue drained by a background delivery worker
// ============================================================================
//! Queued notifier.
//!
//! `send` renders the mail and enqueues it without waiting for delivery; it
//! fails only when the queue is full or its worker is gone. The worker
//! retries each mail up to `max_attempts` times, so delivery is at least once
//! for as long as the process runs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flume::{bounded, Receiver, Sender, TrySendError};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use tourbook_core::domain::{RegistrationInvitation, RegistrationNotice, User};
use tourbook_core::error::DomainError;
use tourbook_core::ports::{InvitationMailer, Notifier};
use tourbook_shared::utils::mask_email;

use super::templates::MailTemplates;
use super::transport::{MailTransport, OutgoingMail};

#[derive(Debug, Clone)]
pub struct MailQueueConfig {
    /// Mails held in memory before `send` starts failing.
    pub queue_capacity: usize,
    pub max_attempts: u32,
    /// Base delay between attempts; grows linearly with the attempt number.
    pub retry_delay: Duration,
}

impl Default for MailQueueConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Clone)]
pub struct QueuedNotifier {
    sender: Sender<OutgoingMail>,
    templates: Arc<MailTemplates>,
}

impl QueuedNotifier {
    /// Spawns the delivery worker. It stops once every `QueuedNotifier`
    /// clone is dropped and the queue is drained.
    pub fn start(
        transport: Arc<dyn MailTransport>,
        templates: MailTemplates,
        config: MailQueueConfig,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = bounded(config.queue_capacity.max(1));

        info!(
            "Starting mail queue: capacity={}, max_attempts={}",
            config.queue_capacity, config.max_attempts
        );
        let worker = tokio::spawn(Self::worker_loop(receiver, transport, config));

        (
            Self {
                sender,
                templates: Arc::new(templates),
            },
            worker,
        )
    }

    fn enqueue(&self, mail: OutgoingMail) -> Result<(), DomainError> {
        let to = mask_email(&mail.to);
        match self.sender.try_send(mail) {
            Ok(()) => {
                debug!("Mail to {} queued", to);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                warn!("Mail queue full, dropping mail to {}", to);
                Err(DomainError::NotificationError("mail queue is full".to_string()))
            }
            Err(TrySendError::Disconnected(_)) => {
                error!("Mail worker is not running, dropping mail to {}", to);
                Err(DomainError::NotificationError("mail queue is closed".to_string()))
            }
        }
    }

    async fn worker_loop(receiver: Receiver<OutgoingMail>, transport: Arc<dyn MailTransport>, config: MailQueueConfig) {
        info!("Mail worker started");
        while let Ok(mail) = receiver.recv_async().await {
            Self::deliver_with_retry(transport.as_ref(), &mail, &config).await;
        }
        info!("Mail worker shutting down (queue closed)");
    }

    async fn deliver_with_retry(transport: &dyn MailTransport, mail: &OutgoingMail, config: &MailQueueConfig) {
        let attempts = config.max_attempts.max(1);
        for attempt in 1..=attempts {
            match transport.deliver(mail).await {
                Ok(()) => {
                    info!("Mail '{}' delivered to {}", mail.subject, mask_email(&mail.to));
                    return;
                }
                Err(e) if attempt < attempts => {
                    warn!("Mail delivery attempt {}/{} failed: {}", attempt, attempts, e);
                    sleep(config.retry_delay * attempt).await;
                }
                Err(e) => {
                    error!(
                        "Giving up on mail '{}' to {} after {} attempts: {}",
                        mail.subject,
                        mask_email(&mail.to),
                        attempts,
                        e
                    );
                }
            }
        }
    }
}

#[async_trait]
impl Notifier for QueuedNotifier {
    async fn send(&self, recipient: &User, notice: &RegistrationNotice) -> Result<(), DomainError> {
        let mail = self
            .templates
            .registration_confirmed(recipient, notice)
            .map_err(|e| DomainError::NotificationError(e.to_string()))?;
        self.enqueue(mail)
    }
}

#[async_trait]
impl InvitationMailer for QueuedNotifier {
    async fn send_invitation(&self, invitation: &RegistrationInvitation, invite_url: &str) -> Result<(), DomainError> {
        let mail = self
            .templates
            .invitation(invitation, invite_url)
            .map_err(|e| DomainError::NotificationError(e.to_string()))?;
        self.enqueue(mail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::transport::MailError;
    use chrono::Utc;
    use parking_lot::Mutex;
    use tourbook_core::domain::Role;

    /// Fails the first `failures` deliveries, then records mails.
    struct FlakyTransport {
        failures: Mutex<u32>,
        attempts: Mutex<u32>,
        delivered: Mutex<Vec<OutgoingMail>>,
    }

    impl FlakyTransport {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures: Mutex::new(failures),
                attempts: Mutex::new(0),
                delivered: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl MailTransport for FlakyTransport {
        async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
            *self.attempts.lock() += 1;
            let mut failures = self.failures.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(MailError::Transport("connection refused".into()));
            }
            self.delivered.lock().push(mail.clone());
            Ok(())
        }
    }

    fn config(capacity: usize, max_attempts: u32) -> MailQueueConfig {
        MailQueueConfig {
            queue_capacity: capacity,
            max_attempts,
            retry_delay: Duration::from_millis(1),
        }
    }

    fn recipient() -> User {
        User::new("Ann".into(), "ann@example.com".into(), "h".into(), Role::Customer, None).unwrap()
    }

    fn notice() -> RegistrationNotice {
        RegistrationNotice {
            activity_name: "Canyon walk".into(),
            start_date: Utc::now(),
            guide_email: "guide@example.com".into(),
        }
    }

    #[tokio::test]
    async fn retries_until_delivered() {
        let transport = FlakyTransport::new(2);
        let (notifier, worker) = QueuedNotifier::start(
            transport.clone(),
            MailTemplates::new("Tourbook").unwrap(),
            config(8, 3),
        );

        notifier.send(&recipient(), &notice()).await.unwrap();
        drop(notifier);
        worker.await.unwrap();

        assert_eq!(*transport.attempts.lock(), 3);
        let delivered = transport.delivered.lock();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].subject, "You have successfully registered");
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let transport = FlakyTransport::new(10);
        let (notifier, worker) = QueuedNotifier::start(
            transport.clone(),
            MailTemplates::new("Tourbook").unwrap(),
            config(8, 2),
        );

        notifier.send(&recipient(), &notice()).await.unwrap();
        drop(notifier);
        worker.await.unwrap();

        assert_eq!(*transport.attempts.lock(), 2);
        assert!(transport.delivered.lock().is_empty());
    }

    #[tokio::test]
    async fn closed_queue_is_a_notification_error() {
        let transport = FlakyTransport::new(0);
        let (notifier, worker) = QueuedNotifier::start(
            transport,
            MailTemplates::new("Tourbook").unwrap(),
            config(8, 1),
        );
        worker.abort();
        let _ = worker.await;

        assert!(matches!(
            notifier.send(&recipient(), &notice()).await,
            Err(DomainError::NotificationError(_))
        ));
    }
}
