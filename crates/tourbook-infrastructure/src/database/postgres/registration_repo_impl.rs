// ============================================================================
// Tourbook Infrastructure - PostgreSQL Registration Repository
// File: crates/tourbook-infrastructure/src/database/postgres/registration_repo_impl.rs
// Description: activity_user join table; uniqueness comes from its primary key
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::warn;
use uuid::Uuid;

use tourbook_core::domain::{Participant, Registration};
use tourbook_core::error::DomainError;
use tourbook_core::repositories::{RegistrationRepository, RegistrationTransaction};

use super::{db_error, is_unique_violation};

pub struct PgRegistrationRepository {
    pool: PgPool,
}

impl PgRegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ParticipantRow {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Participant {
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            registered_at: row.registered_at,
        }
    }
}

#[async_trait]
impl RegistrationRepository for PgRegistrationRepository {
    async fn exists(&self, user_id: &Uuid, activity_id: &Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM activity_user WHERE user_id = $1 AND activity_id = $2)",
        )
        .bind(user_id)
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("checking registration"))
    }

    async fn begin(&self) -> Result<Box<dyn RegistrationTransaction>, DomainError> {
        let tx = self.pool.begin().await.map_err(db_error("opening transaction"))?;
        Ok(Box::new(PgRegistrationTransaction { tx }))
    }

    async fn detach(&self, user_id: &Uuid, activity_id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM activity_user WHERE user_id = $1 AND activity_id = $2")
            .bind(user_id)
            .bind(activity_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("removing registration"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_for_activity(&self, activity_id: &Uuid) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM activity_user WHERE activity_id = $1")
            .bind(activity_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting registrations"))
    }

    async fn participants(&self, activity_id: &Uuid) -> Result<Vec<Participant>, DomainError> {
        let rows: Vec<ParticipantRow> = sqlx::query_as(
            r#"
            SELECT u.id AS user_id, u.name, u.email, au.created_at AS registered_at
            FROM activity_user au
            JOIN users u ON u.id = au.user_id
            WHERE au.activity_id = $1
            ORDER BY au.created_at, u.id
            "#,
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing participants"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

/// One registration write scope. sqlx rolls the transaction back when it is
/// dropped without `commit`.
pub struct PgRegistrationTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RegistrationTransaction for PgRegistrationTransaction {
    async fn insert_association(&mut self, registration: &Registration) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO activity_user (user_id, activity_id, created_at) VALUES ($1, $2, $3)")
            .bind(registration.user_id)
            .bind(registration.activity_id)
            .bind(registration.created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    warn!(
                        "Concurrent registration of user {} to activity {}",
                        registration.user_id, registration.activity_id
                    );
                    DomainError::AlreadyRegistered
                } else {
                    db_error("inserting registration")(e)
                }
            })?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx.commit().await.map_err(db_error("committing registration"))
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.tx.rollback().await.map_err(db_error("rolling back registration"))
    }
}
