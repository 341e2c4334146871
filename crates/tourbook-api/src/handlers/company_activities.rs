// ============================================================================
// Tourbook API - Company Activity Handlers
// File: crates/tourbook-api/src/handlers/company_activities.rs
// Description: Activity management for company owners (multipart forms)
// ============================================================================

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::info;
use uuid::Uuid;

use tourbook_core::domain::{ActivityDraft, Money};
use tourbook_core::ports::PhotoUpload;

use crate::error::ApiError;
use crate::handlers::ActivityView;
use crate::middleware::AuthenticatedUser;
use crate::response::{created, ok};
use crate::state::AppState;

/// Form fields of the activity editor. `image` is optional.
#[derive(Debug, Default)]
struct ActivityForm {
    name: Option<String>,
    description: Option<String>,
    start_date: Option<String>,
    price: Option<String>,
    guide_id: Option<String>,
    image: Option<PhotoUpload>,
}

impl ActivityForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = ActivityForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {}", e)))?
        {
            let field_name = field.name().unwrap_or("").to_string();

            if field_name == "image" {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {}", e)))?;
                // Browsers send an empty part when no file was picked.
                if !file_name.is_empty() || !bytes.is_empty() {
                    form.image = Some(PhotoUpload { file_name, bytes: bytes.to_vec() });
                }
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Invalid {}: {}", field_name, e)))?;
            match field_name.as_str() {
                "name" => form.name = Some(text),
                "description" => form.description = Some(text),
                "start_date" => form.start_date = Some(text),
                "price" => form.price = Some(text),
                "guide_id" => form.guide_id = Some(text),
                _ => {}
            }
        }

        Ok(form)
    }

    fn into_parts(self) -> Result<(ActivityDraft, Option<PhotoUpload>), ApiError> {
        let name = required(self.name, "name")?;
        let description = required(self.description, "description")?;
        let start_date = parse_start_date(&required(self.start_date, "start_date")?)?;
        let price = required(self.price, "price")?
            .parse::<Money>()
            .map_err(|e| ApiError::Validation(format!("price: {}", e)))?;
        let guide_id = Uuid::parse_str(required(self.guide_id, "guide_id")?.trim())
            .map_err(|_| ApiError::Validation("guide_id: must be a valid id".to_string()))?;

        let draft = ActivityDraft { name, description, start_date, price, guide_id };
        Ok((draft, self.image))
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{}: field is required", field)))
}

/// Accepts RFC 3339 or the `YYYY-MM-DD HH:MM` format of the editor form,
/// the latter read as UTC.
fn parse_start_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|_| ApiError::Validation("start_date: expected YYYY-MM-DD HH:MM".to_string()))
}

/// GET /api/v1/companies/{id}/activities
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(company_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let activities = state.company_activities.list(&user, &company_id).await?;
    let views: Vec<ActivityView> = activities.into_iter().map(ActivityView::from).collect();
    Ok(ok(views))
}

/// POST /api/v1/companies/{id}/activities
pub async fn create(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(company_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let (draft, photo) = ActivityForm::read(multipart).await?.into_parts()?;
    info!("Creating activity '{}' for company {}", draft.name, company_id);

    let activity = state
        .company_activities
        .create(&user, &company_id, draft, photo)
        .await?;
    Ok(created(ActivityView::from(activity)))
}

/// PUT /api/v1/companies/{id}/activities/{activity_id}
pub async fn update(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((company_id, activity_id)): Path<(Uuid, Uuid)>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let (draft, photo) = ActivityForm::read(multipart).await?.into_parts()?;
    let activity = state
        .company_activities
        .update(&user, &company_id, &activity_id, draft, photo)
        .await?;
    Ok(ok(ActivityView::from(activity)))
}

/// DELETE /api/v1/companies/{id}/activities/{activity_id}
pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((company_id, activity_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    state
        .company_activities
        .delete(&user, &company_id, &activity_id)
        .await?;
    Ok(ok(serde_json::json!({ "deleted": activity_id })))
}
