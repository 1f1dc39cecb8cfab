//! Participant API endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::data::TransactionalService;
use crate::data::types::ParticipantRow;
use crate::utils::time::secs_to_iso;

#[derive(Clone)]
pub struct ParticipantsApiState {
    pub database: Arc<TransactionalService>,
}

pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    Router::new()
        .route("/", get(list_participants).post(create_participant))
        .with_state(ParticipantsApiState { database })
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub id: String,
    pub name: String,
    pub rfid_tag: String,
    pub created_at: String,
}

impl From<ParticipantRow> for ParticipantDto {
    fn from(row: ParticipantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            rfid_tag: row.rfid_tag,
            created_at: secs_to_iso(row.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateParticipantRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Unique RFID chip identifier
    #[serde(default)]
    #[validate(length(min = 1, message = "rfidTag is required"))]
    pub rfid_tag: String,
}

#[utoipa::path(
    get,
    path = "/api/participants",
    tag = "timing",
    responses((status = 200, description = "All participants", body = Vec<ParticipantDto>))
)]
pub async fn list_participants(
    State(state): State<ParticipantsApiState>,
) -> Result<Json<Vec<ParticipantDto>>, ApiError> {
    let rows = state.database.repository().list_participants().await?;
    Ok(Json(rows.into_iter().map(ParticipantDto::from).collect()))
}

/// Register a participant; a taken RFID tag is a 409
#[utoipa::path(
    post,
    path = "/api/participants",
    tag = "timing",
    request_body = CreateParticipantRequest,
    responses(
        (status = 201, description = "Participant created", body = ParticipantDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "RFID tag already registered")
    )
)]
pub async fn create_participant(
    State(state): State<ParticipantsApiState>,
    ValidatedJson(body): ValidatedJson<CreateParticipantRequest>,
) -> Result<(StatusCode, Json<ParticipantDto>), ApiError> {
    let row = state
        .database
        .repository()
        .create_participant(body.name.trim(), body.rfid_tag.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(ParticipantDto::from(row))))
}
