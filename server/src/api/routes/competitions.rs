//! Competition API endpoints

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
use crate::data::types::CompetitionRow;
use crate::utils::time::secs_to_iso;

#[derive(Clone)]
pub struct CompetitionsApiState {
    pub database: Arc<TransactionalService>,
}

pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    Router::new()
        .route("/", get(list_competitions).post(create_competition))
        .route("/{id}", get(get_competition))
        .with_state(CompetitionsApiState { database })
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<CompetitionRow> for CompetitionDto {
    fn from(row: CompetitionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: secs_to_iso(row.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompetitionRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "name is required (max 200 characters)"))]
    pub name: String,
    pub description: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/competitions",
    tag = "competitions",
    responses((status = 200, description = "All competitions", body = Vec<CompetitionDto>))
)]
pub async fn list_competitions(
    State(state): State<CompetitionsApiState>,
) -> Result<Json<Vec<CompetitionDto>>, ApiError> {
    let rows = state.database.repository().list_competitions().await?;
    Ok(Json(rows.into_iter().map(CompetitionDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/competitions",
    tag = "competitions",
    request_body = CreateCompetitionRequest,
    responses(
        (status = 201, description = "Competition created", body = CompetitionDto),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_competition(
    State(state): State<CompetitionsApiState>,
    ValidatedJson(body): ValidatedJson<CreateCompetitionRequest>,
) -> Result<(StatusCode, Json<CompetitionDto>), ApiError> {
    let row = state
        .database
        .repository()
        .create_competition(body.name.trim(), body.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(CompetitionDto::from(row))))
}

#[utoipa::path(
    get,
    path = "/api/competitions/{id}",
    tag = "competitions",
    params(("id" = String, Path, description = "Competition ID")),
    responses(
        (status = 200, description = "Competition", body = CompetitionDto),
        (status = 404, description = "Competition not found")
    )
)]
pub async fn get_competition(
    State(state): State<CompetitionsApiState>,
    path: IdPath,
) -> Result<Json<CompetitionDto>, ApiError> {
    let row = state
        .database
        .repository()
        .get_competition(&path.id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(
                "COMPETITION_NOT_FOUND",
                format!("Competition not found: {}", path.id),
            )
        })?;
    Ok(Json(CompetitionDto::from(row)))
}
