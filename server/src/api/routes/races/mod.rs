//! Race API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::extractors::IdPath;
use crate::api::types::{ApiError, MessageResponse};
use crate::data::TransactionalService;

use types::{ListRacesQuery, RaceDto, RaceRequest};

/// Shared state for Races API endpoints
#[derive(Clone)]
pub struct RacesApiState {
    pub database: Arc<TransactionalService>,
}

/// Build Races API routes
pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    Router::new()
        .route("/", get(list_races).post(create_race))
        .route("/{id}", get(get_race).put(update_race).delete(delete_race))
        .with_state(RacesApiState { database })
}

fn race_not_found(id: &str) -> ApiError {
    ApiError::not_found("RACE_NOT_FOUND", format!("Race not found: {}", id))
}

/// List races, optionally for one race event
#[utoipa::path(
    get,
    path = "/api/races",
    tag = "races",
    params(
        ("raceEventId" = Option<String>, Query, description = "Only races of this event")
    ),
    responses(
        (status = 200, description = "Races ordered by start time", body = Vec<RaceDto>)
    )
)]
pub async fn list_races(
    State(state): State<RacesApiState>,
    Query(query): Query<ListRacesQuery>,
) -> Result<Json<Vec<RaceDto>>, ApiError> {
    let races = state
        .database
        .repository()
        .list_races(query.race_event_id.as_deref())
        .await?;
    Ok(Json(races.into_iter().map(RaceDto::from).collect()))
}

/// Create a race inside an existing race event
#[utoipa::path(
    post,
    path = "/api/races",
    tag = "races",
    request_body = RaceRequest,
    responses(
        (status = 201, description = "Race created", body = RaceDto),
        (status = 400, description = "Invalid race or unknown race event")
    )
)]
pub async fn create_race(
    State(state): State<RacesApiState>,
    Json(body): Json<RaceRequest>,
) -> Result<(StatusCode, Json<RaceDto>), ApiError> {
    let race_event_id = body
        .race_event_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::validation("raceEventId is required"))?;
    let new_race = body
        .race
        .to_new_race()
        .map_err(|e| ApiError::validation(e.message(None)))?;

    let race = state
        .database
        .repository()
        .create_race(race_event_id, &new_race)
        .await?;

    tracing::debug!(race_id = %race.id, race_event_id, "Race created");
    Ok((StatusCode::CREATED, Json(RaceDto::from(race))))
}

/// Get a single race
#[utoipa::path(
    get,
    path = "/api/races/{id}",
    tag = "races",
    params(("id" = String, Path, description = "Race ID")),
    responses(
        (status = 200, description = "Race details", body = RaceDto),
        (status = 404, description = "Race not found")
    )
)]
pub async fn get_race(
    State(state): State<RacesApiState>,
    path: IdPath,
) -> Result<Json<RaceDto>, ApiError> {
    let race = state
        .database
        .repository()
        .get_race(&path.id)
        .await?
        .ok_or_else(|| race_not_found(&path.id))?;
    Ok(Json(RaceDto::from(race)))
}

/// Replace a race's fields
#[utoipa::path(
    put,
    path = "/api/races/{id}",
    tag = "races",
    params(("id" = String, Path, description = "Race ID")),
    request_body = RaceRequest,
    responses(
        (status = 200, description = "Race updated", body = RaceDto),
        (status = 400, description = "Invalid race"),
        (status = 404, description = "Race not found")
    )
)]
pub async fn update_race(
    State(state): State<RacesApiState>,
    path: IdPath,
    Json(body): Json<RaceRequest>,
) -> Result<Json<RaceDto>, ApiError> {
    let new_race = body
        .race
        .to_new_race()
        .map_err(|e| ApiError::validation(e.message(None)))?;

    let race = state
        .database
        .repository()
        .update_race(&path.id, &new_race)
        .await?
        .ok_or_else(|| race_not_found(&path.id))?;
    Ok(Json(RaceDto::from(race)))
}

/// Delete a race (its timings go with it)
#[utoipa::path(
    delete,
    path = "/api/races/{id}",
    tag = "races",
    params(("id" = String, Path, description = "Race ID")),
    responses(
        (status = 200, description = "Race deleted", body = MessageResponse),
        (status = 404, description = "Race not found")
    )
)]
pub async fn delete_race(
    State(state): State<RacesApiState>,
    path: IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.database.repository().delete_race(&path.id).await? {
        return Err(race_not_found(&path.id));
    }
    Ok(Json(MessageResponse::new("Race deleted successfully")))
}
