// ============================================================================
// Tourbook Core - Company Member Service
// File: crates/tourbook-core/src/services/member_service.rs
// Description: Owners and guides of a company, invited by email
// ============================================================================

use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use tourbook_security::InvitationToken;
use tourbook_shared::types::Pagination;
use tourbook_shared::utils::{mask_email, normalize_email};

use crate::domain::{RegistrationInvitation, Role, User};
use crate::error::DomainError;
use crate::policy::{self, Action, Actor, Resource};
use crate::ports::InvitationMailer;
use crate::repositories::{ActivityRepository, CompanyRepository, InvitationRepository, UserRepository};

/// Which members of a company an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Owners,
    Guides,
}

impl MemberKind {
    pub fn role(&self) -> Role {
        match self {
            MemberKind::Owners => Role::CompanyOwner,
            MemberKind::Guides => Role::Guide,
        }
    }

    fn max_name_length(&self) -> usize {
        match self {
            MemberKind::Owners => 35,
            MemberKind::Guides => 55,
        }
    }
}

pub struct MemberService {
    users: Arc<dyn UserRepository>,
    companies: Arc<dyn CompanyRepository>,
    activities: Arc<dyn ActivityRepository>,
    invitations: Arc<dyn InvitationRepository>,
    mailer: Arc<dyn InvitationMailer>,
    public_url: String,
}

impl MemberService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        companies: Arc<dyn CompanyRepository>,
        activities: Arc<dyn ActivityRepository>,
        invitations: Arc<dyn InvitationRepository>,
        mailer: Arc<dyn InvitationMailer>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            companies,
            activities,
            invitations,
            mailer,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn list(&self, actor: &User, company_id: &Uuid, kind: MemberKind) -> Result<Vec<User>, DomainError> {
        self.authorize(actor, Action::View, company_id).await?;
        self.users.list_by_company_and_role(company_id, kind.role()).await
    }

    /// Records an invitation and mails its link. No user exists until the
    /// invitee registers with the token.
    pub async fn invite(
        &self,
        actor: &User,
        company_id: &Uuid,
        kind: MemberKind,
        email: &str,
    ) -> Result<RegistrationInvitation, DomainError> {
        self.authorize(actor, Action::Create, company_id).await?;

        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Invite rejected, user exists: {}", mask_email(&email));
            return Err(DomainError::EmailAlreadyExists(email));
        }
        if self.invitations.find_by_email(&email).await?.is_some() {
            warn!("Invite rejected, already requested: {}", mask_email(&email));
            return Err(DomainError::InvitationAlreadyRequested(email));
        }

        let token = InvitationToken::generate();
        let invitation = RegistrationInvitation::new(&email, token.digest.clone(), *company_id, kind.role())?;
        let invitation = self.invitations.create(&invitation).await?;

        let invite_url = format!("{}/register?invitation_token={}", self.public_url, token.plain);
        if let Err(e) = self.mailer.send_invitation(&invitation, &invite_url).await {
            error!("Invitation mail to {} failed: {}", mask_email(&email), e);
            if let Err(cleanup) = self.invitations.delete(&invitation.id).await {
                error!("Failed to discard invitation {}: {}", invitation.id, cleanup);
            }
            return Err(e);
        }

        info!("Invited {} as {} of company {}", mask_email(&email), kind.role().as_str(), company_id);
        Ok(invitation)
    }

    pub async fn update(
        &self,
        actor: &User,
        company_id: &Uuid,
        kind: MemberKind,
        member_id: &Uuid,
        name: &str,
        email: &str,
    ) -> Result<User, DomainError> {
        self.authorize(actor, Action::Update, company_id).await?;
        let mut member = self.member(company_id, kind, member_id).await?;

        let length = name.trim().chars().count();
        if !(2..=kind.max_name_length()).contains(&length) {
            return Err(DomainError::ValidationError(format!(
                "name: must be between 2 and {} characters",
                kind.max_name_length()
            )));
        }

        let email = normalize_email(email);
        if let Some(other) = self.users.find_by_email(&email).await? {
            if other.id != member.id {
                return Err(DomainError::EmailAlreadyExists(email));
            }
        }

        member.update_profile(name, &email)?;
        let updated = self.users.update(&member).await?;
        info!("Company {} member {} updated", company_id, updated.id);
        Ok(updated)
    }

    /// Soft delete; the member's history stays in the store. A guide who
    /// still leads activities stays until those are reassigned or deleted.
    pub async fn remove(&self, actor: &User, company_id: &Uuid, kind: MemberKind, member_id: &Uuid) -> Result<(), DomainError> {
        self.authorize(actor, Action::Delete, company_id).await?;
        let member = self.member(company_id, kind, member_id).await?;

        if kind == MemberKind::Guides {
            let led = self.activities.list_by_guide(&member.id, Pagination::new(1, 1)).await?.total;
            if led > 0 {
                warn!("Guide {} of company {} still leads {} activities", member.id, company_id, led);
                return Err(DomainError::ValidationError(format!(
                    "guide: still leads {} activities, reassign or delete them first",
                    led
                )));
            }
        }

        self.users.soft_delete(&member.id).await?;
        info!("Company {} member {} removed", company_id, member.id);
        Ok(())
    }

    async fn authorize(&self, actor: &User, action: Action, company_id: &Uuid) -> Result<(), DomainError> {
        policy::ensure(
            &Actor::from(actor),
            action,
            &Resource::CompanyMembers { company_id: *company_id },
        )?;
        if self.companies.find_by_id(company_id).await?.is_none() {
            return Err(DomainError::CompanyNotFound);
        }
        Ok(())
    }

    /// A member outside the company, or of another kind, does not exist here.
    async fn member(&self, company_id: &Uuid, kind: MemberKind, member_id: &Uuid) -> Result<User, DomainError> {
        match self.users.find_by_id(member_id).await? {
            Some(user) if user.belongs_to(company_id) && user.role == kind.role() => Ok(user),
            _ => Err(DomainError::MemberNotFound),
        }
    }
}
