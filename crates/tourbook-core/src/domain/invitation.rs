//! Registration invitation entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::role::Role;
use crate::error::DomainError;

/// Invitation to join a company as owner or guide. Only the token digest is
/// persisted; the plain token travels in the invite mail.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegistrationInvitation {
    pub id: Uuid,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[serde(skip_serializing)]
    pub token_digest: String,

    pub company_id: Uuid,
    pub role: Role,
    pub registered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RegistrationInvitation {
    pub fn new(email: &str, token_digest: String, company_id: Uuid, role: Role) -> Result<Self, DomainError> {
        if !role.is_company_staff() {
            return Err(DomainError::ValidationError(format!(
                "role: {} cannot be granted by invitation",
                role.as_str()
            )));
        }
        let invitation = Self {
            id: Uuid::new_v4(),
            email: tourbook_shared::utils::normalize_email(email),
            token_digest,
            company_id,
            role,
            registered_at: None,
            created_at: Utc::now(),
        };
        invitation.validate()?;
        Ok(invitation)
    }

    pub fn is_consumed(&self) -> bool {
        self.registered_at.is_some()
    }

    pub fn matches_email(&self, email: &str) -> bool {
        self.email == tourbook_shared::utils::normalize_email(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customers_cannot_be_invited() {
        assert!(RegistrationInvitation::new("a@b.io", "d".into(), Uuid::new_v4(), Role::Customer).is_err());
        assert!(RegistrationInvitation::new("a@b.io", "d".into(), Uuid::new_v4(), Role::Administrator).is_err());
    }

    #[test]
    fn email_match_is_case_insensitive() {
        let inv = RegistrationInvitation::new("Guide@Example.com", "d".into(), Uuid::new_v4(), Role::Guide).unwrap();
        assert!(inv.matches_email("guide@example.COM"));
        assert!(!inv.matches_email("other@example.com"));
        assert!(!inv.is_consumed());
    }
}
