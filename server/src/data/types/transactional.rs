//! Row and input types for the transactional store
//!
//! Timestamps and date-times are unix seconds.

use serde::{Deserialize, Serialize};

use super::enums::{RaceEventSort, SortDirection, UserRole};
use crate::domain::filters::FilterExpression;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerRow {
    pub id: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceEventRow {
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
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceRow {
    pub id: String,
    pub race_event_id: String,
    pub name: Option<String>,
    pub elevation: Option<f64>,
    pub length: f64,
    pub start_location: Option<String>,
    pub start_date_time: i64,
    pub end_date_time: Option<i64>,
    pub gps_file: Option<String>,
    pub competition_id: Option<String>,
}

/// Race event with its races, ordered by start time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceEventWithRaces {
    pub event: RaceEventRow,
    pub races: Vec<RaceRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRow {
    pub id: String,
    pub name: String,
    pub rfid_tag: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointRow {
    pub id: String,
    pub name: String,
    pub location: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingRow {
    pub id: String,
    pub participant_id: String,
    pub checkpoint_id: String,
    pub race_id: String,
    pub timestamp: i64,
}

/// Timing record joined with the records it points at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingWithRelations {
    pub timing: TimingRow,
    pub participant: ParticipantRow,
    pub checkpoint: CheckpointRow,
    pub race: RaceRow,
}

/// Writable race-event fields
#[derive(Debug, Clone, Default)]
pub struct NewRaceEvent {
    pub event_name: String,
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
}

/// Writable race fields
#[derive(Debug, Clone, Default)]
pub struct NewRace {
    pub name: Option<String>,
    pub elevation: Option<f64>,
    pub length: f64,
    pub start_location: Option<String>,
    pub start_date_time: i64,
    pub end_date_time: Option<i64>,
    pub gps_file: Option<String>,
    pub competition_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewOrganizer {
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
}

/// Race-event search parameters
#[derive(Debug, Clone)]
pub struct ListRaceEventsParams {
    pub filter: FilterExpression,
    pub page: u32,
    pub limit: u32,
    pub sort_by: RaceEventSort,
    pub order: SortDirection,
}

impl Default for ListRaceEventsParams {
    fn default() -> Self {
        Self {
            filter: FilterExpression::default(),
            page: 1,
            limit: 10,
            sort_by: RaceEventSort::default(),
            order: SortDirection::default(),
        }
    }
}
