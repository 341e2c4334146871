// ============================================================================
// Tourbook Infrastructure - PostgreSQL Invitation Repository
// File: crates/tourbook-infrastructure/src/database/postgres/invitation_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use tourbook_core::domain::{RegistrationInvitation, Role};
use tourbook_core::error::DomainError;
use tourbook_core::repositories::InvitationRepository;

use super::{db_error, is_unique_violation};

pub struct PgInvitationRepository {
    pool: PgPool,
}

impl PgInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct InvitationRow {
    pub id: Uuid,
    pub email: String,
    pub token_digest: String,
    pub company_id: Uuid,
    pub role: String,
    pub registered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<InvitationRow> for RegistrationInvitation {
    fn from(row: InvitationRow) -> Self {
        RegistrationInvitation {
            id: row.id,
            email: row.email,
            token_digest: row.token_digest,
            company_id: row.company_id,
            role: Role::from_str(&row.role).unwrap_or(Role::Guide),
            registered_at: row.registered_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<RegistrationInvitation>, DomainError> {
        let row: Option<InvitationRow> = sqlx::query_as(
            r#"
            SELECT id, email, token_digest, company_id, role, registered_at, created_at
            FROM registration_invitations
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding invitation by email"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_pending_by_digest(&self, digest: &str) -> Result<Option<RegistrationInvitation>, DomainError> {
        let row: Option<InvitationRow> = sqlx::query_as(
            r#"
            SELECT id, email, token_digest, company_id, role, registered_at, created_at
            FROM registration_invitations
            WHERE token_digest = $1 AND registered_at IS NULL
            "#,
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding invitation by token"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn create(&self, invitation: &RegistrationInvitation) -> Result<RegistrationInvitation, DomainError> {
        info!("Creating invitation {} for company {}", invitation.id, invitation.company_id);

        let row: InvitationRow = sqlx::query_as(
            r#"
            INSERT INTO registration_invitations (
                id, email, token_digest, company_id, role, registered_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, token_digest, company_id, role, registered_at, created_at
            "#,
        )
        .bind(invitation.id)
        .bind(&invitation.email)
        .bind(&invitation.token_digest)
        .bind(invitation.company_id)
        .bind(invitation.role.as_str())
        .bind(invitation.registered_at)
        .bind(invitation.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::InvitationAlreadyRequested(invitation.email.clone())
            } else {
                db_error("creating invitation")(e)
            }
        })?;

        Ok(row.into())
    }

    async fn mark_registered(&self, id: &Uuid, at: DateTime<Utc>) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE registration_invitations SET registered_at = $2 WHERE id = $1 AND registered_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_error("consuming invitation"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::InvitationNotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM registration_invitations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting invitation"))?;
        Ok(())
    }
}
