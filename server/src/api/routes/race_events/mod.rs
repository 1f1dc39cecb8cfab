//! Race event API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::extractors::{IdPath, SlugPath, ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, MessageResponse, PaginatedResponse};
use crate::data::TransactionalService;
use crate::data::types::ListRaceEventsParams;
use crate::domain::compile;
use crate::domain::slug::race_event_slug;
use crate::utils::time::secs_to_datetime;

use types::{ListRaceEventsQuery, RaceEventDto, RaceEventRequest};

/// Shared state for Race Events API endpoints
#[derive(Clone)]
pub struct RaceEventsApiState {
    pub database: Arc<TransactionalService>,
}

/// Build Race Events API routes
pub fn routes(database: Arc<TransactionalService>) -> Router<()> {
    Router::new()
        .route("/", get(list_race_events).post(create_race_event))
        .route("/slug/{slug}", get(get_race_event_by_slug))
        .route(
            "/{id}",
            get(get_race_event)
                .put(update_race_event)
                .delete(delete_race_event),
        )
        .with_state(RaceEventsApiState { database })
}

fn race_event_not_found(key: &str) -> ApiError {
    ApiError::not_found(
        "RACE_EVENT_NOT_FOUND",
        format!("Race event not found: {}", key),
    )
}

/// List race events matching the query-string filters
///
/// Any key other than page, limit, sortBy and order is compiled into a
/// filter (`eventName=x`, `length_gte=10`, `tags_in=a,b`, `startDateTime_lte=...`).
#[utoipa::path(
    get,
    path = "/api/race-events",
    tag = "race-events",
    params(ListRaceEventsQuery),
    responses(
        (status = 200, description = "Page of race events with their races"),
        (status = 400, description = "Invalid filter or pagination")
    )
)]
pub async fn list_race_events(
    State(state): State<RaceEventsApiState>,
    ValidatedQuery(query): ValidatedQuery<ListRaceEventsQuery>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<PaginatedResponse<RaceEventDto>>, ApiError> {
    let filter = compile(pairs);
    tracing::trace!(filter = %filter.to_json(), "Compiled race event filter");

    let params = ListRaceEventsParams {
        filter,
        page: query.page,
        limit: query.limit,
        sort_by: query.sort_by,
        order: query.order,
    };
    let (events, total) = state
        .database
        .repository()
        .list_race_events(&params)
        .await?;

    let data = events.into_iter().map(RaceEventDto::from).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.page,
        query.limit,
        total,
    )))
}

/// Create a race event together with its races
#[utoipa::path(
    post,
    path = "/api/race-events",
    tag = "race-events",
    request_body = RaceEventRequest,
    responses(
        (status = 201, description = "Race event created", body = RaceEventDto),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_race_event(
    State(state): State<RaceEventsApiState>,
    ValidatedJson(body): ValidatedJson<RaceEventRequest>,
) -> Result<(StatusCode, Json<RaceEventDto>), ApiError> {
    let races = body
        .to_new_races()
        .map_err(ApiError::validation)?
        .unwrap_or_default();
    let event = body.to_new_event();

    let first_start = races.first().map(|r| secs_to_datetime(r.start_date_time));
    let base_slug = race_event_slug(&event.event_name, first_start, Utc::now());

    let created = state
        .database
        .repository()
        .create_race_event(&base_slug, &event, &races)
        .await?;

    tracing::debug!(
        race_event_id = %created.event.id,
        slug = %created.event.slug,
        races = created.races.len(),
        "Race event created"
    );
    Ok((StatusCode::CREATED, Json(RaceEventDto::from(created))))
}

/// Get a race event by ID
#[utoipa::path(
    get,
    path = "/api/race-events/{id}",
    tag = "race-events",
    params(("id" = String, Path, description = "Race event ID")),
    responses(
        (status = 200, description = "Race event with races", body = RaceEventDto),
        (status = 404, description = "Race event not found")
    )
)]
pub async fn get_race_event(
    State(state): State<RaceEventsApiState>,
    path: IdPath,
) -> Result<Json<RaceEventDto>, ApiError> {
    let event = state
        .database
        .repository()
        .get_race_event(&path.id)
        .await?
        .ok_or_else(|| race_event_not_found(&path.id))?;
    Ok(Json(RaceEventDto::from(event)))
}

/// Get a race event by slug
#[utoipa::path(
    get,
    path = "/api/race-events/slug/{slug}",
    tag = "race-events",
    params(("slug" = String, Path, description = "Race event slug")),
    responses(
        (status = 200, description = "Race event with races", body = RaceEventDto),
        (status = 404, description = "Race event not found")
    )
)]
pub async fn get_race_event_by_slug(
    State(state): State<RaceEventsApiState>,
    path: SlugPath,
) -> Result<Json<RaceEventDto>, ApiError> {
    let event = state
        .database
        .repository()
        .get_race_event_by_slug(&path.slug)
        .await?
        .ok_or_else(|| race_event_not_found(&path.slug))?;
    Ok(Json(RaceEventDto::from(event)))
}

/// Replace a race event; a `races` array replaces all of its races
#[utoipa::path(
    put,
    path = "/api/race-events/{id}",
    tag = "race-events",
    params(("id" = String, Path, description = "Race event ID")),
    request_body = RaceEventRequest,
    responses(
        (status = 200, description = "Race event updated", body = RaceEventDto),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Race event not found")
    )
)]
pub async fn update_race_event(
    State(state): State<RaceEventsApiState>,
    path: IdPath,
    ValidatedJson(body): ValidatedJson<RaceEventRequest>,
) -> Result<Json<RaceEventDto>, ApiError> {
    let races = body.to_new_races().map_err(ApiError::validation)?;
    let event = body.to_new_event();

    let updated = state
        .database
        .repository()
        .update_race_event(&path.id, &event, races.as_deref())
        .await?
        .ok_or_else(|| race_event_not_found(&path.id))?;
    Ok(Json(RaceEventDto::from(updated)))
}

/// Delete a race event and its races
#[utoipa::path(
    delete,
    path = "/api/race-events/{id}",
    tag = "race-events",
    params(("id" = String, Path, description = "Race event ID")),
    responses(
        (status = 200, description = "Race event deleted", body = MessageResponse),
        (status = 404, description = "Race event not found")
    )
)]
pub async fn delete_race_event(
    State(state): State<RaceEventsApiState>,
    path: IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state
        .database
        .repository()
        .delete_race_event(&path.id)
        .await?
    {
        return Err(race_event_not_found(&path.id));
    }
    Ok(Json(MessageResponse::new("Race event deleted successfully")))
}
