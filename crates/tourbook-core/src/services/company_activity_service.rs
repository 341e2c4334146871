//! Company-side management of activities and their photos.

use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{Activity, ActivityDraft, Role, User};
use crate::error::DomainError;
use crate::policy::{self, Action, Actor, Resource};
use crate::ports::{PhotoStorage, PhotoUpload};
use crate::repositories::{ActivityRepository, CompanyRepository, UserRepository};

pub struct CompanyActivityService {
    activities: Arc<dyn ActivityRepository>,
    companies: Arc<dyn CompanyRepository>,
    users: Arc<dyn UserRepository>,
    photos: Arc<dyn PhotoStorage>,
}

impl CompanyActivityService {
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        companies: Arc<dyn CompanyRepository>,
        users: Arc<dyn UserRepository>,
        photos: Arc<dyn PhotoStorage>,
    ) -> Self {
        Self {
            activities,
            companies,
            users,
            photos,
        }
    }

    pub async fn list(&self, actor: &User, company_id: &Uuid) -> Result<Vec<Activity>, DomainError> {
        self.authorize(actor, Action::View, company_id).await?;
        self.activities.list_by_company(company_id).await
    }

    pub async fn create(
        &self,
        actor: &User,
        company_id: &Uuid,
        draft: ActivityDraft,
        photo: Option<PhotoUpload>,
    ) -> Result<Activity, DomainError> {
        self.authorize(actor, Action::Create, company_id).await?;
        draft.check()?;
        self.ensure_company_guide(company_id, &draft.guide_id).await?;

        let reference = self.store_photo(photo.as_ref()).await?;
        let activity = Activity::new(*company_id, draft, reference.clone())?;

        match self.activities.create(&activity).await {
            Ok(created) => {
                info!("Activity created: {} ({}) for company {}", created.name, created.id, company_id);
                Ok(created)
            }
            Err(e) => {
                if let Some(reference) = reference {
                    self.discard_photo(&reference).await;
                }
                Err(e)
            }
        }
    }

    /// Replacing the photo deletes the previous file once the update is stored.
    pub async fn update(
        &self,
        actor: &User,
        company_id: &Uuid,
        activity_id: &Uuid,
        draft: ActivityDraft,
        photo: Option<PhotoUpload>,
    ) -> Result<Activity, DomainError> {
        self.authorize(actor, Action::Update, company_id).await?;
        let mut activity = self.activity(company_id, activity_id).await?;
        draft.check()?;
        self.ensure_company_guide(company_id, &draft.guide_id).await?;

        let previous = activity.photo.clone();
        let reference = self.store_photo(photo.as_ref()).await?;
        activity.apply(draft, reference.clone())?;

        let updated = match self.activities.update(&activity).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(reference) = reference {
                    self.discard_photo(&reference).await;
                }
                return Err(e);
            }
        };

        if let (Some(_), Some(old)) = (&reference, previous) {
            self.discard_photo(&old).await;
        }
        info!("Activity updated: {}", updated.id);
        Ok(updated)
    }

    pub async fn delete(&self, actor: &User, company_id: &Uuid, activity_id: &Uuid) -> Result<(), DomainError> {
        self.authorize(actor, Action::Delete, company_id).await?;
        let activity = self.activity(company_id, activity_id).await?;

        self.activities.delete(&activity.id).await?;
        if let Some(photo) = &activity.photo {
            self.discard_photo(photo).await;
        }
        info!("Activity deleted: {}", activity.id);
        Ok(())
    }

    async fn authorize(&self, actor: &User, action: Action, company_id: &Uuid) -> Result<(), DomainError> {
        policy::ensure(
            &Actor::from(actor),
            action,
            &Resource::CompanyActivities { company_id: *company_id },
        )?;
        if self.companies.find_by_id(company_id).await?.is_none() {
            return Err(DomainError::CompanyNotFound);
        }
        Ok(())
    }

    async fn activity(&self, company_id: &Uuid, activity_id: &Uuid) -> Result<Activity, DomainError> {
        match self.activities.find_by_id(activity_id).await? {
            Some(activity) if activity.company_id == *company_id => Ok(activity),
            _ => Err(DomainError::ActivityNotFound),
        }
    }

    async fn ensure_company_guide(&self, company_id: &Uuid, guide_id: &Uuid) -> Result<(), DomainError> {
        match self.users.find_by_id(guide_id).await? {
            Some(guide) if guide.role == Role::Guide && guide.belongs_to(company_id) => Ok(()),
            _ => Err(DomainError::ValidationError(
                "guide_id: must be a guide of this company".to_string(),
            )),
        }
    }

    async fn store_photo(&self, photo: Option<&PhotoUpload>) -> Result<Option<String>, DomainError> {
        match photo {
            Some(upload) => {
                upload.check()?;
                Ok(Some(self.photos.store(upload).await?))
            }
            None => Ok(None),
        }
    }

    async fn discard_photo(&self, reference: &str) {
        if let Err(e) = self.photos.delete(reference).await {
            error!("Failed to delete photo {}: {}", reference, e);
        }
    }
}
