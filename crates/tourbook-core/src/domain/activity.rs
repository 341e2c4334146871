// ============================================================================
// Tourbook Core - Activity Entity
// File: crates/tourbook-core/src/domain/activity.rs
// Description: Bookable activity owned by a company and led by a guide
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tourbook_shared::constants::NO_IMAGE_THUMBNAIL;

use super::money::Money;
use crate::error::DomainError;

/// Lowest accepted activity price.
pub const MIN_PRICE: Money = Money::from_minor(100);

/// Editable part of an activity, as submitted by a company owner.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ActivityDraft {
    #[validate(length(min = 3, max = 255, message = "Name must be between 3 and 255 characters"))]
    pub name: String,

    #[validate(length(min = 3, max = 1000, message = "Description must be between 3 and 1000 characters"))]
    pub description: String,

    pub start_date: DateTime<Utc>,
    pub price: Money,
    pub guide_id: Uuid,
}

impl ActivityDraft {
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()?;
        if self.price < MIN_PRICE {
            return Err(DomainError::ValidationError(format!(
                "price: must be at least {}",
                MIN_PRICE
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub guide_id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub price: Money,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Activity {
    pub fn new(company_id: Uuid, draft: ActivityDraft, photo: Option<String>) -> Result<Self, DomainError> {
        draft.check()?;
        Ok(Self {
            id: Uuid::new_v4(),
            company_id,
            guide_id: draft.guide_id,
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            start_date: draft.start_date,
            price: draft.price,
            photo,
            created_at: Utc::now(),
            modified_at: None,
        })
    }

    /// Applies a new draft. A `None` photo keeps the current one.
    pub fn apply(&mut self, draft: ActivityDraft, photo: Option<String>) -> Result<(), DomainError> {
        draft.check()?;
        self.guide_id = draft.guide_id;
        self.name = draft.name.trim().to_string();
        self.description = draft.description.trim().to_string();
        self.start_date = draft.start_date;
        self.price = draft.price;
        if photo.is_some() {
            self.photo = photo;
        }
        self.modified_at = Some(Utc::now());
        Ok(())
    }

    pub fn thumbnail(&self) -> String {
        format!("/activities/thumbs/{}", self.photo.as_deref().unwrap_or(NO_IMAGE_THUMBNAIL))
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_date > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft() -> ActivityDraft {
        ActivityDraft {
            name: "Kayak tour".to_string(),
            description: "Three hours on the lake".to_string(),
            start_date: Utc::now() + Duration::days(1),
            price: Money::from_minor(4_500),
            guide_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn creates_activity_from_valid_draft() {
        let activity = Activity::new(Uuid::new_v4(), draft(), None).unwrap();
        assert_eq!(activity.price.to_string(), "45.00");
        assert!(activity.is_upcoming(Utc::now()));
        assert_eq!(activity.thumbnail(), "/activities/thumbs/no_image.jpg");
    }

    #[test]
    fn price_below_minimum_is_rejected() {
        let mut d = draft();
        d.price = Money::from_minor(99);
        assert!(matches!(
            Activity::new(Uuid::new_v4(), d, None),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn short_name_is_rejected() {
        let mut d = draft();
        d.name = "ab".to_string();
        assert!(Activity::new(Uuid::new_v4(), d, None).is_err());
    }

    #[test]
    fn apply_keeps_photo_when_none_given() {
        let mut activity = Activity::new(Uuid::new_v4(), draft(), Some("a.jpg".to_string())).unwrap();
        activity.apply(draft(), None).unwrap();
        assert_eq!(activity.photo.as_deref(), Some("a.jpg"));
        activity.apply(draft(), Some("b.jpg".to_string())).unwrap();
        assert_eq!(activity.thumbnail(), "/activities/thumbs/b.jpg");
    }
}
