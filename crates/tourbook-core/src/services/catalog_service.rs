//! Read side of the activity catalog: public listings, a user's own
//! activities, and the guide's view with participant lists.

use std::sync::Arc;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use tourbook_shared::types::{Page, Pagination};

use crate::domain::{Activity, Participant, User};
use crate::error::DomainError;
use crate::policy::{self, Action, Actor, Resource};
use crate::repositories::{ActivityRepository, RegistrationRepository, UserRepository};

#[derive(Debug, Clone, Serialize)]
pub struct GuideContact {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityDetails {
    #[serde(flatten)]
    pub activity: Activity,
    pub thumbnail: String,
    pub guide: Option<GuideContact>,
    pub participants_count: i64,
    /// Whether the viewing user is registered. Always false for anonymous viewers.
    pub registered: bool,
}

pub struct CatalogService {
    activities: Arc<dyn ActivityRepository>,
    users: Arc<dyn UserRepository>,
    registrations: Arc<dyn RegistrationRepository>,
}

impl CatalogService {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        users: Arc<dyn UserRepository>,
        registrations: Arc<dyn RegistrationRepository>,
    ) -> Self {
        Self {
            activities,
            users,
            registrations,
        }
    }

    pub async fn upcoming(&self, pagination: Pagination) -> Result<Page<Activity>, DomainError> {
        self.activities.list_upcoming(Utc::now(), pagination).await
    }

    pub async fn show(&self, activity_id: &Uuid, viewer: Option<&User>) -> Result<ActivityDetails, DomainError> {
        let activity = self
            .activities
            .find_by_id(activity_id)
            .await?
            .ok_or(DomainError::ActivityNotFound)?;

        let guide = self
            .users
            .find_by_id(&activity.guide_id)
            .await?
            .map(|g| GuideContact { name: g.name, email: g.email });

        let participants_count = self.registrations.count_for_activity(&activity.id).await?;

        let registered = match viewer {
            Some(user) => self.registrations.exists(&user.id, &activity.id).await?,
            None => false,
        };

        Ok(ActivityDetails {
            thumbnail: activity.thumbnail(),
            activity,
            guide,
            participants_count,
            registered,
        })
    }

    pub async fn my_activities(&self, user: &User, pagination: Pagination) -> Result<Page<Activity>, DomainError> {
        self.activities.list_for_participant(&user.id, pagination).await
    }

    pub async fn guide_activities(&self, actor: &User, pagination: Pagination) -> Result<Page<Activity>, DomainError> {
        policy::ensure(
            &Actor::from(actor),
            Action::View,
            &Resource::GuideActivities { guide_id: actor.id },
        )?;
        self.activities.list_by_guide(&actor.id, pagination).await
    }

    /// Participants ordered by registration time.
    pub async fn participants(&self, actor: &User, activity_id: &Uuid) -> Result<Vec<Participant>, DomainError> {
        let activity = self
            .activities
            .find_by_id(activity_id)
            .await?
            .ok_or(DomainError::ActivityNotFound)?;

        policy::ensure(
            &Actor::from(actor),
            Action::View,
            &Resource::GuideActivities { guide_id: activity.guide_id },
        )?;

        self.registrations.participants(&activity.id).await
    }
}
