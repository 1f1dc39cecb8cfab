//! Checkpoint API endpoints

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
use crate::data::types::CheckpointRow;
use crate::utils::time::secs_to_iso;

#[derive(Clone)]
pub struct CheckpointsApiState {
    pub database: Arc<TransactionalService>,
}

pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    Router::new()
        .route("/", get(list_checkpoints).post(create_checkpoint))
        .with_state(CheckpointsApiState { database })
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointDto {
    pub id: String,
    pub name: String,
    pub location: String,
    pub created_at: String,
}

impl From<CheckpointRow> for CheckpointDto {
    fn from(row: CheckpointRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            location: row.location,
            created_at: secs_to_iso(row.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCheckpointRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
}

#[utoipa::path(
    get,
    path = "/api/checkpoints",
    tag = "timing",
    responses((status = 200, description = "All checkpoints", body = Vec<CheckpointDto>))
)]
pub async fn list_checkpoints(
    State(state): State<CheckpointsApiState>,
) -> Result<Json<Vec<CheckpointDto>>, ApiError> {
    let rows = state.database.repository().list_checkpoints().await?;
    Ok(Json(rows.into_iter().map(CheckpointDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/checkpoints",
    tag = "timing",
    request_body = CreateCheckpointRequest,
    responses(
        (status = 201, description = "Checkpoint created", body = CheckpointDto),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_checkpoint(
    State(state): State<CheckpointsApiState>,
    ValidatedJson(body): ValidatedJson<CreateCheckpointRequest>,
) -> Result<(StatusCode, Json<CheckpointDto>), ApiError> {
    let row = state
        .database
        .repository()
        .create_checkpoint(body.name.trim(), body.location.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(CheckpointDto::from(row))))
}
