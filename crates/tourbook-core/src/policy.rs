// ============================================================================
// Tourbook Core - Authorization Policy
// File: crates/tourbook-core/src/policy.rs
// Description: Single decision point keyed by (actor role, resource ownership)
// ============================================================================

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{Role, User};
use crate::error::DomainError;

/// The authenticated user as seen by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            company_id: user.company_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The company registry itself.
    Companies,
    /// Owners and guides of one company.
    CompanyMembers { company_id: Uuid },
    /// Activities of one company.
    CompanyActivities { company_id: Uuid },
    /// Activities led by a guide, with their participant lists.
    GuideActivities { guide_id: Uuid },
    /// A user's own registrations.
    Registrations { user_id: Uuid },
}

pub fn authorize(actor: &Actor, action: Action, resource: &Resource) -> bool {
    match resource {
        Resource::Companies => actor.role == Role::Administrator,
        Resource::CompanyMembers { company_id } | Resource::CompanyActivities { company_id } => {
            match actor.role {
                Role::Administrator => true,
                Role::CompanyOwner => actor.company_id.as_ref() == Some(company_id),
                Role::Guide | Role::Customer => false,
            }
        }
        Resource::GuideActivities { guide_id } => {
            action == Action::View && actor.role == Role::Guide && actor.user_id == *guide_id
        }
        Resource::Registrations { user_id } => actor.user_id == *user_id,
    }
}

/// Like [`authorize`], but as a `Result` for `?` chains.
pub fn ensure(actor: &Actor, action: Action, resource: &Resource) -> Result<(), DomainError> {
    if authorize(actor, action, resource) {
        return Ok(());
    }
    warn!(
        "Access denied: user {} ({}) {:?} {:?}",
        actor.user_id,
        actor.role.as_str(),
        action,
        resource
    );
    Err(DomainError::Forbidden(format!("{:?} on {:?}", action, resource)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, company_id: Option<Uuid>) -> Actor {
        Actor { user_id: Uuid::new_v4(), role, company_id }
    }

    const ALL_ACTIONS: [Action; 4] = [Action::View, Action::Create, Action::Update, Action::Delete];

    #[test]
    fn administrator_manages_every_company() {
        let admin = actor(Role::Administrator, None);
        let company_id = Uuid::new_v4();
        for action in ALL_ACTIONS {
            assert!(authorize(&admin, action, &Resource::Companies));
            assert!(authorize(&admin, action, &Resource::CompanyMembers { company_id }));
            assert!(authorize(&admin, action, &Resource::CompanyActivities { company_id }));
        }
    }

    #[test]
    fn owner_is_scoped_to_own_company() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let owner = actor(Role::CompanyOwner, Some(own));
        for action in ALL_ACTIONS {
            assert!(authorize(&owner, action, &Resource::CompanyMembers { company_id: own }));
            assert!(authorize(&owner, action, &Resource::CompanyActivities { company_id: own }));
            assert!(!authorize(&owner, action, &Resource::CompanyMembers { company_id: other }));
            assert!(!authorize(&owner, action, &Resource::CompanyActivities { company_id: other }));
        }
        assert!(!authorize(&owner, Action::View, &Resource::Companies));
    }

    #[test]
    fn guide_sees_only_own_activities() {
        let company_id = Uuid::new_v4();
        let guide = actor(Role::Guide, Some(company_id));
        assert!(authorize(&guide, Action::View, &Resource::GuideActivities { guide_id: guide.user_id }));
        assert!(!authorize(&guide, Action::View, &Resource::GuideActivities { guide_id: Uuid::new_v4() }));
        assert!(!authorize(&guide, Action::Update, &Resource::GuideActivities { guide_id: guide.user_id }));
        assert!(!authorize(&guide, Action::View, &Resource::CompanyMembers { company_id }));
    }

    #[test]
    fn non_guides_have_no_guide_view() {
        let admin = actor(Role::Administrator, None);
        assert!(!authorize(&admin, Action::View, &Resource::GuideActivities { guide_id: admin.user_id }));
    }

    #[test]
    fn customer_cannot_manage_anything() {
        let customer = actor(Role::Customer, None);
        let company_id = Uuid::new_v4();
        for action in ALL_ACTIONS {
            assert!(!authorize(&customer, action, &Resource::Companies));
            assert!(!authorize(&customer, action, &Resource::CompanyMembers { company_id }));
            assert!(!authorize(&customer, action, &Resource::CompanyActivities { company_id }));
        }
    }

    #[test]
    fn registrations_belong_to_their_user_only() {
        let customer = actor(Role::Customer, None);
        let admin = actor(Role::Administrator, None);
        let own = Resource::Registrations { user_id: customer.user_id };
        assert!(authorize(&customer, Action::Delete, &own));
        assert!(!authorize(&admin, Action::Delete, &own));
        assert!(matches!(ensure(&admin, Action::Delete, &own), Err(DomainError::Forbidden(_))));
    }
}
