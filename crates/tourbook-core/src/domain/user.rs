// ============================================================================
// Tourbook Core - User Entity
// File: crates/tourbook-core/src/domain/user.rs
// Description: Account entity shared by every role
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"), length(max = 255))]
    pub email: String,

    #[serde(skip_serializing)]
    pub password: String,

    pub role: Role,
    pub company_id: Option<Uuid>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    pub removed_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        name: String,
        email: String,
        password_hash: String,
        role: Role,
        company_id: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let user = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: tourbook_shared::utils::normalize_email(&email),
            password: password_hash,
            role,
            company_id,
            created_at: Utc::now(),
            modified_at: None,
            removed_at: None,
        };

        user.validate()?;
        Ok(user)
    }

    pub fn update_profile(&mut self, name: &str, email: &str) -> Result<(), validator::ValidationErrors> {
        self.name = name.trim().to_string();
        self.email = tourbook_shared::utils::normalize_email(email);
        self.modified_at = Some(Utc::now());
        self.validate()
    }

    pub fn soft_delete(&mut self) {
        self.removed_at = Some(Utc::now());
    }

    pub fn is_deleted(&self) -> bool {
        self.removed_at.is_some()
    }

    pub fn belongs_to(&self, company_id: &Uuid) -> bool {
        self.company_id.as_ref() == Some(company_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_normalizes_email() {
        let user = User::new(
            " Ann ".to_string(),
            "Ann@Example.com".to_string(),
            "hash".to_string(),
            Role::Customer,
            None,
        )
        .unwrap();
        assert_eq!(user.name, "Ann");
        assert_eq!(user.email, "ann@example.com");
        assert!(!user.is_deleted());
    }

    #[test]
    fn invalid_email_is_rejected() {
        let user = User::new(
            "Ann".to_string(),
            "not-an-email".to_string(),
            "hash".to_string(),
            Role::Customer,
            None,
        );
        assert!(user.is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User::new(
            "Ann".to_string(),
            "ann@example.com".to_string(),
            "secret-hash".to_string(),
            Role::Guide,
            Some(Uuid::new_v4()),
        )
        .unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
