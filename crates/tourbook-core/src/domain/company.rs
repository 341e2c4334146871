//! Company entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Company {
    pub id: Uuid,

    #[validate(length(min = 2, max = 255, message = "Company name must be between 2 and 255 characters"))]
    pub name: String,

    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Company {
    pub fn new(name: String) -> Result<Self, validator::ValidationErrors> {
        let company = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            created_at: Utc::now(),
            modified_at: None,
        };

        company.validate()?;
        Ok(company)
    }

    pub fn rename(&mut self, name: &str) -> Result<(), validator::ValidationErrors> {
        self.name = name.trim().to_string();
        self.modified_at = Some(Utc::now());
        self.validate()
    }
}
