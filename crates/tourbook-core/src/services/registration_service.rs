// ============================================================================
// Tourbook Core - Registration Service
// File: crates/tourbook-core/src/services/registration_service.rs
// Description: Registers users to activities inside one store transaction
// ============================================================================
//! Registration and withdrawal of a user to an activity.
//!
//! `attempt_register` never returns an error: storage and notification
//! failures are logged and reported as [`RegistrationStatus::Failure`] with a
//! generic apology.
//!
//! [`RegistrationStatus::Failure`]: crate::domain::RegistrationStatus::Failure

use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    Activity, Registration, RegistrationNotice, RegistrationOutcome, User, WithdrawOutcome,
};
use crate::error::DomainError;
use crate::ports::Notifier;
use crate::repositories::{ActivityRepository, RegistrationRepository, UserRepository};

pub struct RegistrationService {
    registrations: Arc<dyn RegistrationRepository>,
    users: Arc<dyn UserRepository>,
    activities: Arc<dyn ActivityRepository>,
    notifier: Arc<dyn Notifier>,
}

impl RegistrationService {
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        users: Arc<dyn UserRepository>,
        activities: Arc<dyn ActivityRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registrations,
            users,
            activities,
            notifier,
        }
    }

    /// Registers `user` to `activity` and sends the confirmation.
    ///
    /// An existing association is reported as a conflict before any
    /// transaction is opened. The confirmation is handed to the notifier
    /// only after the association is committed; if the notifier refuses it,
    /// the association is deleted again, so a failed attempt stores nothing
    /// and sends nothing.
    pub async fn attempt_register(&self, user: &User, activity: &Activity) -> RegistrationOutcome {
        match self.registrations.exists(&user.id, &activity.id).await {
            Ok(true) => {
                info!("User {} already registered to activity {}", user.id, activity.id);
                return RegistrationOutcome::conflict();
            }
            Ok(false) => {}
            Err(e) => {
                error!("Registration check failed for activity {}: {}", activity.id, e);
                return RegistrationOutcome::failure();
            }
        }

        match self.register_and_notify(user, activity).await {
            Ok(()) => {
                info!("User {} registered to activity {}", user.id, activity.id);
                RegistrationOutcome::success()
            }
            Err(e) => {
                error!(
                    "Registration of user {} to activity {} failed: {}",
                    user.id, activity.id, e
                );
                RegistrationOutcome::failure()
            }
        }
    }

    /// Loads both parties, then behaves like [`Self::attempt_register`].
    pub async fn register_by_id(&self, user_id: &Uuid, activity_id: &Uuid) -> Result<RegistrationOutcome, DomainError> {
        let user = self.users.find_by_id(user_id).await?.ok_or(DomainError::UserNotFound)?;
        let activity = self
            .activities
            .find_by_id(activity_id)
            .await?
            .ok_or(DomainError::ActivityNotFound)?;

        Ok(self.attempt_register(&user, &activity).await)
    }

    /// Removes the caller's own association only.
    pub async fn withdraw(&self, user_id: &Uuid, activity_id: &Uuid) -> Result<WithdrawOutcome, DomainError> {
        if self.registrations.detach(user_id, activity_id).await? {
            info!("User {} withdrew from activity {}", user_id, activity_id);
            Ok(WithdrawOutcome::success())
        } else {
            warn!("Withdraw: user {} is not registered to activity {}", user_id, activity_id);
            Ok(WithdrawOutcome::not_registered())
        }
    }

    async fn register_and_notify(&self, user: &User, activity: &Activity) -> Result<(), DomainError> {
        let notice = self.notice_for(activity).await?;
        let registration = Registration::new(user.id, activity.id);

        let mut tx = self.registrations.begin().await?;
        if let Err(e) = tx.insert_association(&registration).await {
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback failed for activity {}: {}", activity.id, rollback_err);
            }
            return Err(e);
        }
        tx.commit().await?;

        if let Err(e) = self.notifier.send(user, &notice).await {
            self.undo(&registration).await;
            return Err(e);
        }
        Ok(())
    }

    /// Deletes a committed association whose confirmation could not be sent.
    async fn undo(&self, registration: &Registration) {
        match self
            .registrations
            .detach(&registration.user_id, &registration.activity_id)
            .await
        {
            Ok(_) => warn!(
                "Registration of user {} to activity {} undone, confirmation not sent",
                registration.user_id, registration.activity_id
            ),
            Err(e) => error!(
                "Could not undo registration of user {} to activity {}: {}",
                registration.user_id, registration.activity_id, e
            ),
        }
    }

    async fn notice_for(&self, activity: &Activity) -> Result<RegistrationNotice, DomainError> {
        let guide = self
            .users
            .find_by_id(&activity.guide_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        Ok(RegistrationNotice {
            activity_name: activity.name.clone(),
            start_date: activity.start_date,
            guide_email: guide.email,
        })
    }
}
