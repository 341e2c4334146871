// ============================================================================
// Tourbook Infrastructure - PostgreSQL Activity Repository
// File: crates/tourbook-infrastructure/src/database/postgres/activity_repo_impl.rs
// Description: Prices are stored as BIGINT minor units
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use tourbook_core::domain::{Activity, Money};
use tourbook_core::error::DomainError;
use tourbook_core::repositories::ActivityRepository;
use tourbook_shared::types::{Page, Pagination};

use super::db_error;

pub struct PgActivityRepository {
    pool: PgPool,
}

impl PgActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ActivityRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub guide_id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub price: i64,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<ActivityRow> for Activity {
    fn from(row: ActivityRow) -> Self {
        Activity {
            id: row.id,
            company_id: row.company_id,
            guide_id: row.guide_id,
            name: row.name,
            description: row.description,
            start_date: row.start_date,
            price: Money::from_minor(row.price),
            photo: row.photo,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

const ACTIVITY_COLUMNS: &str = "a.id, a.company_id, a.guide_id, a.name, a.description, a.start_date, \
     a.price, a.photo, a.created_at, a.modified_at";

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Activity>, DomainError> {
        let row: Option<ActivityRow> = sqlx::query_as(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities a WHERE a.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding activity by id"))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_upcoming(&self, now: DateTime<Utc>, pagination: Pagination) -> Result<Page<Activity>, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activities WHERE start_date > $1")
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting upcoming activities"))?;

        let rows: Vec<ActivityRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ACTIVITY_COLUMNS} FROM activities a
            WHERE a.start_date > $1
            ORDER BY a.start_date, a.id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(now)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing upcoming activities"))?;

        Ok(Page::new(rows.into_iter().map(Activity::from).collect(), pagination, total))
    }

    async fn list_by_company(&self, company_id: &Uuid) -> Result<Vec<Activity>, DomainError> {
        let rows: Vec<ActivityRow> = sqlx::query_as(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities a WHERE a.company_id = $1 ORDER BY a.start_date"
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing company activities"))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list_by_guide(&self, guide_id: &Uuid, pagination: Pagination) -> Result<Page<Activity>, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activities WHERE guide_id = $1")
            .bind(guide_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting guide activities"))?;

        let rows: Vec<ActivityRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ACTIVITY_COLUMNS} FROM activities a
            WHERE a.guide_id = $1
            ORDER BY a.start_date, a.id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(guide_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing guide activities"))?;

        Ok(Page::new(rows.into_iter().map(Activity::from).collect(), pagination, total))
    }

    async fn list_for_participant(&self, user_id: &Uuid, pagination: Pagination) -> Result<Page<Activity>, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_user WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting user registrations"))?;

        let rows: Vec<ActivityRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ACTIVITY_COLUMNS} FROM activities a
            JOIN activity_user au ON au.activity_id = a.id
            WHERE au.user_id = $1
            ORDER BY a.start_date, a.id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("listing user activities"))?;

        Ok(Page::new(rows.into_iter().map(Activity::from).collect(), pagination, total))
    }

    async fn create(&self, activity: &Activity) -> Result<Activity, DomainError> {
        info!("Creating activity: {}", activity.name);

        let row: ActivityRow = sqlx::query_as(
            r#"
            INSERT INTO activities (
                id, company_id, guide_id, name, description,
                start_date, price, photo, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, company_id, guide_id, name, description,
                      start_date, price, photo, created_at, modified_at
            "#,
        )
        .bind(activity.id)
        .bind(activity.company_id)
        .bind(activity.guide_id)
        .bind(&activity.name)
        .bind(&activity.description)
        .bind(activity.start_date)
        .bind(activity.price.minor())
        .bind(&activity.photo)
        .bind(activity.created_at)
        .bind(activity.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating activity"))?;

        Ok(row.into())
    }

    async fn update(&self, activity: &Activity) -> Result<Activity, DomainError> {
        let row: Option<ActivityRow> = sqlx::query_as(
            r#"
            UPDATE activities
            SET guide_id = $2, name = $3, description = $4, start_date = $5,
                price = $6, photo = $7, modified_at = $8
            WHERE id = $1
            RETURNING id, company_id, guide_id, name, description,
                      start_date, price, photo, created_at, modified_at
            "#,
        )
        .bind(activity.id)
        .bind(activity.guide_id)
        .bind(&activity.name)
        .bind(&activity.description)
        .bind(activity.start_date)
        .bind(activity.price.minor())
        .bind(&activity.photo)
        .bind(activity.modified_at.unwrap_or_else(Utc::now))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating activity"))?;

        row.map(|r| r.into()).ok_or(DomainError::ActivityNotFound)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting activity"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ActivityNotFound);
        }
        Ok(())
    }
}
