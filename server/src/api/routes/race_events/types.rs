//! Race event API types

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::api::routes::races::types::{RaceDto, RaceInput};
use crate::api::types::{default_limit, default_page, validate_limit, validate_page};
use crate::data::types::{NewRace, NewRaceEvent, RaceEventSort, RaceEventWithRaces, SortDirection};
use crate::utils::time::secs_to_iso;

/// Race event DTO for API responses (races embedded)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaceEventDto {
    pub id: String,
    pub event_name: String,
    pub slug: String,
    pub description: Option<String>,
    pub main_image: Option<String>,
    pub gallery: Vec<String>,
    pub organizer_id: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub organizer_site: Option<String>,
    pub registration_site: Option<String>,
    pub social_media: Option<String>,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub races: Vec<RaceDto>,
}

impl From<RaceEventWithRaces> for RaceEventDto {
    fn from(value: RaceEventWithRaces) -> Self {
        let e = value.event;
        Self {
            id: e.id,
            event_name: e.event_name,
            slug: e.slug,
            description: e.description,
            main_image: e.main_image,
            gallery: e.gallery,
            organizer_id: e.organizer_id,
            contact_phone: e.contact_phone,
            contact_email: e.contact_email,
            organizer_site: e.organizer_site,
            registration_site: e.registration_site,
            social_media: e.social_media,
            tags: e.tags,
            created_at: secs_to_iso(e.created_at),
            updated_at: secs_to_iso(e.updated_at),
            races: value.races.into_iter().map(RaceDto::from).collect(),
        }
    }
}

fn validate_event_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("event_name_required")
            .with_message("eventName is required".into()));
    }
    Ok(())
}

/// Request body for creating or replacing a race event
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaceEventRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_event_name"))]
    pub event_name: String,
    pub description: Option<String>,
    pub main_image: Option<String>,
    pub gallery: Option<Vec<String>>,
    pub organizer_id: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub organizer_site: Option<String>,
    pub registration_site: Option<String>,
    pub social_media: Option<String>,
    pub tags: Option<Vec<String>>,
    /// On update, present means "replace all races"
    pub races: Option<Vec<RaceInput>>,
}

impl RaceEventRequest {
    pub fn to_new_event(&self) -> NewRaceEvent {
        NewRaceEvent {
            event_name: self.event_name.trim().to_string(),
            description: self.description.clone(),
            main_image: self.main_image.clone(),
            gallery: self.gallery.clone().unwrap_or_default(),
            organizer_id: self.organizer_id.clone().filter(|s| !s.is_empty()),
            contact_phone: self.contact_phone.clone(),
            contact_email: self.contact_email.clone(),
            organizer_site: self.organizer_site.clone(),
            registration_site: self.registration_site.clone(),
            social_media: self.social_media.clone(),
            tags: self.tags.clone().unwrap_or_default(),
        }
    }

    /// Validate nested races in order; the first failure wins
    ///
    /// `Ok(None)` when the body carries no `races` key.
    pub fn to_new_races(&self) -> Result<Option<Vec<NewRace>>, String> {
        let Some(races) = &self.races else {
            return Ok(None);
        };
        races
            .iter()
            .enumerate()
            .map(|(i, race)| race.to_new_race().map_err(|e| e.message(Some(i + 1))))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Pagination and sorting params for listing race events
///
/// Every other query key is a search filter.
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListRaceEventsQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,

    /// eventName, createdAt, updatedAt or slug
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub sort_by: RaceEventSort,

    /// asc or desc
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub order: SortDirection,
}
