//! Organizer API endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::types::ApiError;
use crate::data::TransactionalService;
use crate::data::types::{NewOrganizer, OrganizerRow};
use crate::utils::time::secs_to_iso;

#[derive(Clone)]
pub struct OrganizersApiState {
    pub database: Arc<TransactionalService>,
}

pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    Router::new()
        .route("/", get(list_organizers).post(create_organizer))
        .route("/{id}", get(get_organizer))
        .with_state(OrganizersApiState { database })
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerDto {
    pub id: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub created_at: String,
}

impl From<OrganizerRow> for OrganizerDto {
    fn from(row: OrganizerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            website: row.website,
            created_at: secs_to_iso(row.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizerRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "name is required (max 200 characters)"))]
    pub name: String,
    #[validate(email(message = "contactEmail must be a valid email"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/organizers",
    tag = "organizers",
    responses((status = 200, description = "All organizers", body = Vec<OrganizerDto>))
)]
pub async fn list_organizers(
    State(state): State<OrganizersApiState>,
) -> Result<Json<Vec<OrganizerDto>>, ApiError> {
    let rows = state.database.repository().list_organizers().await?;
    Ok(Json(rows.into_iter().map(OrganizerDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/organizers",
    tag = "organizers",
    request_body = CreateOrganizerRequest,
    responses(
        (status = 201, description = "Organizer created", body = OrganizerDto),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_organizer(
    State(state): State<OrganizersApiState>,
    ValidatedJson(body): ValidatedJson<CreateOrganizerRequest>,
) -> Result<(StatusCode, Json<OrganizerDto>), ApiError> {
    let organizer = NewOrganizer {
        name: body.name.trim().to_string(),
        contact_email: body.contact_email,
        contact_phone: body.contact_phone,
        website: body.website,
    };
    let row = state
        .database
        .repository()
        .create_organizer(&organizer)
        .await?;
    Ok((StatusCode::CREATED, Json(OrganizerDto::from(row))))
}

#[utoipa::path(
    get,
    path = "/api/organizers/{id}",
    tag = "organizers",
    params(("id" = String, Path, description = "Organizer ID")),
    responses(
        (status = 200, description = "Organizer", body = OrganizerDto),
        (status = 404, description = "Organizer not found")
    )
)]
pub async fn get_organizer(
    State(state): State<OrganizersApiState>,
    path: IdPath,
) -> Result<Json<OrganizerDto>, ApiError> {
    let row = state
        .database
        .repository()
        .get_organizer(&path.id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(
                "ORGANIZER_NOT_FOUND",
                format!("Organizer not found: {}", path.id),
            )
        })?;
    Ok(Json(OrganizerDto::from(row)))
}
