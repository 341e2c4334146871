// ============================================================================
// Tourbook Infrastructure - PostgreSQL User Repository
// File: crates/tourbook-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use tourbook_core::domain::{Role, User};
use tourbook_core::error::DomainError;
use tourbook_core::repositories::UserRepository;

use super::{db_error, is_unique_violation};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    pub removed_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            role: Role::from_str(&row.role).unwrap_or_default(),
            company_id: row.company_id,
            created_at: row.created_at,
            modified_at: row.modified_at,
            removed_at: row.removed_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, name, email, password, role, company_id, created_at, modified_at, removed_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND removed_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding user by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) AND removed_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding user by email"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_by_company_and_role(&self, company_id: &Uuid, role: Role) -> Result<Vec<User>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE company_id = $1 AND role = $2 AND removed_at IS NULL
            ORDER BY name
            "#
        ))
        .bind(company_id)
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing company users"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        info!("Creating user: {}", user.id);

        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users ({USER_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .bind(user.company_id)
        .bind(user.created_at)
        .bind(user.modified_at)
        .bind(user.removed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::EmailAlreadyExists(user.email.clone())
            } else {
                db_error("creating user")(e)
            }
        })?;

        Ok(row.into())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET name = $2, email = $3, password = $4, role = $5, company_id = $6, modified_at = $7
            WHERE id = $1 AND removed_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .bind(user.company_id)
        .bind(user.modified_at.unwrap_or_else(Utc::now))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::EmailAlreadyExists(user.email.clone())
            } else {
                db_error("updating user")(e)
            }
        })?;

        row.map(|r| r.into()).ok_or(DomainError::UserNotFound)
    }

    async fn soft_delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE users SET removed_at = NOW() WHERE id = $1 AND removed_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("removing user"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound);
        }
        info!("User removed: {}", id);
        Ok(())
    }
}
