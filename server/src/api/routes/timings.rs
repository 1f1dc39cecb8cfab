//! Timing API endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::routes::checkpoints::CheckpointDto;
use crate::api::routes::participants::ParticipantDto;
use crate::api::routes::races::types::RaceDto;
use crate::api::types::ApiError;
use crate::data::TransactionalService;
use crate::data::types::{TimingRow, TimingWithRelations};
use crate::utils::time::{parse_datetime, secs_to_iso};

#[derive(Clone)]
pub struct TimingsApiState {
    pub database: Arc<TransactionalService>,
}

pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    Router::new()
        .route("/", get(list_timings).post(create_timing))
        .with_state(TimingsApiState { database })
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimingDto {
    pub id: String,
    pub participant_id: String,
    pub checkpoint_id: String,
    pub race_id: String,
    pub timestamp: String,
}

impl From<TimingRow> for TimingDto {
    fn from(row: TimingRow) -> Self {
        Self {
            id: row.id,
            participant_id: row.participant_id,
            checkpoint_id: row.checkpoint_id,
            race_id: row.race_id,
            timestamp: secs_to_iso(row.timestamp),
        }
    }
}

/// Timing with the records it points at
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimingDetailDto {
    #[serde(flatten)]
    pub timing: TimingDto,
    pub participant: ParticipantDto,
    pub checkpoint: CheckpointDto,
    pub race: RaceDto,
}

impl From<TimingWithRelations> for TimingDetailDto {
    fn from(value: TimingWithRelations) -> Self {
        Self {
            timing: value.timing.into(),
            participant: value.participant.into(),
            checkpoint: value.checkpoint.into(),
            race: value.race.into(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimingRequest {
    pub participant_id: Option<String>,
    pub checkpoint_id: Option<String>,
    pub race_id: Option<String>,
    /// RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`
    pub timestamp: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{} is required", field)))
}

#[utoipa::path(
    get,
    path = "/api/timings",
    tag = "timing",
    responses((status = 200, description = "All timings, newest first", body = Vec<TimingDetailDto>))
)]
pub async fn list_timings(
    State(state): State<TimingsApiState>,
) -> Result<Json<Vec<TimingDetailDto>>, ApiError> {
    let rows = state.database.repository().list_timings().await?;
    Ok(Json(rows.into_iter().map(TimingDetailDto::from).collect()))
}

/// Record a checkpoint passage
#[utoipa::path(
    post,
    path = "/api/timings",
    tag = "timing",
    request_body = CreateTimingRequest,
    responses(
        (status = 201, description = "Timing recorded", body = TimingDto),
        (status = 400, description = "Missing field, bad timestamp or unknown reference")
    )
)]
pub async fn create_timing(
    State(state): State<TimingsApiState>,
    Json(body): Json<CreateTimingRequest>,
) -> Result<(StatusCode, Json<TimingDto>), ApiError> {
    let participant_id = required(&body.participant_id, "participantId")?;
    let checkpoint_id = required(&body.checkpoint_id, "checkpointId")?;
    let race_id = required(&body.race_id, "raceId")?;
    let raw_timestamp = required(&body.timestamp, "timestamp")?;
    let timestamp = parse_datetime(raw_timestamp)
        .ok_or_else(|| ApiError::validation("timestamp must be a valid date"))?;

    let row = state
        .database
        .repository()
        .create_timing(participant_id, checkpoint_id, race_id, timestamp.timestamp())
        .await?;

    tracing::debug!(timing_id = %row.id, race_id, checkpoint_id, "Timing recorded");
    Ok((StatusCode::CREATED, Json(TimingDto::from(row))))
}
