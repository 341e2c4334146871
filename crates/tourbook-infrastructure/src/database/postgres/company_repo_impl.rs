// ============================================================================
// Tourbook Infrastructure - PostgreSQL Company Repository
// File: crates/tourbook-infrastructure/src/database/postgres/company_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use tourbook_core::domain::Company;
use tourbook_core::error::DomainError;
use tourbook_core::repositories::CompanyRepository;

use super::{db_error, is_unique_violation};

pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Company>, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(
            "SELECT id, name, created_at, modified_at FROM companies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding company by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Company>, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(
            "SELECT id, name, created_at, modified_at FROM companies WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding company by name"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self) -> Result<Vec<Company>, DomainError> {
        let rows: Vec<CompanyRow> = sqlx::query_as(
            "SELECT id, name, created_at, modified_at FROM companies ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing companies"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, company: &Company) -> Result<Company, DomainError> {
        info!("Creating company: {}", company.name);

        let row: CompanyRow = sqlx::query_as(
            r#"
            INSERT INTO companies (id, name, created_at, modified_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, created_at, modified_at
            "#,
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(company.created_at)
        .bind(company.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::CompanyNameAlreadyExists(company.name.clone())
            } else {
                db_error("creating company")(e)
            }
        })?;

        Ok(row.into())
    }

    async fn update(&self, company: &Company) -> Result<Company, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(
            r#"
            UPDATE companies SET name = $2, modified_at = $3
            WHERE id = $1
            RETURNING id, name, created_at, modified_at
            "#,
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(company.modified_at.unwrap_or_else(Utc::now))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::CompanyNameAlreadyExists(company.name.clone())
            } else {
                db_error("updating company")(e)
            }
        })?;

        row.map(|r| r.into()).ok_or(DomainError::CompanyNotFound)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting company"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::CompanyNotFound);
        }
        Ok(())
    }
}
