//! HTTP handlers

pub mod health;
pub mod auth;
pub mod activities;
pub mod registrations;
pub mod guide;
pub mod companies;
pub mod members;
pub mod company_activities;

use serde::{Deserialize, Serialize};

use tourbook_core::domain::Activity;
use tourbook_shared::types::Pagination;

/// `?page=` on listing endpoints; pages hold nine activities.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::page(self.page)
    }
}

/// Activity as shown in listings.
#[derive(Debug, Serialize)]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: Activity,
    pub thumbnail: String,
}

impl From<Activity> for ActivityView {
    fn from(activity: Activity) -> Self {
        Self {
            thumbnail: activity.thumbnail(),
            activity,
        }
    }
}
