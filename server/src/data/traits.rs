//! Repository trait for the transactional store
//!
//! Handlers talk to storage only through `TransactionalRepository`; the
//! SQLite backend implements it for `Arc<SqliteService>`.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{
    CheckpointRow, CompetitionRow, ListRaceEventsParams, NewOrganizer, NewRace, NewRaceEvent,
    OrganizerRow, ParticipantRow, RaceEventWithRaces, RaceRow, TimingRow, TimingWithRelations,
    UserRole, UserRow,
};

#[async_trait]
pub trait TransactionalRepository: Send + Sync {
    // ==================== User Operations ====================

    /// Create a user; `Conflict` if the email is taken
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<UserRow, DataError>;

    async fn get_user(&self, id: &str) -> Result<Option<UserRow>, DataError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DataError>;

    // ==================== Race Event Operations ====================

    /// Create an event with its races; the slug is made unique
    async fn create_race_event(
        &self,
        base_slug: &str,
        event: &NewRaceEvent,
        races: &[NewRace],
    ) -> Result<RaceEventWithRaces, DataError>;

    async fn get_race_event(&self, id: &str) -> Result<Option<RaceEventWithRaces>, DataError>;

    async fn get_race_event_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<RaceEventWithRaces>, DataError>;

    /// Filtered, sorted page of events plus the total match count
    async fn list_race_events(
        &self,
        params: &ListRaceEventsParams,
    ) -> Result<(Vec<RaceEventWithRaces>, u64), DataError>;

    /// Replace event fields; `Some(races)` also replaces its races
    async fn update_race_event(
        &self,
        id: &str,
        event: &NewRaceEvent,
        races: Option<&[NewRace]>,
    ) -> Result<Option<RaceEventWithRaces>, DataError>;

    async fn delete_race_event(&self, id: &str) -> Result<bool, DataError>;

    // ==================== Race Operations ====================

    async fn create_race(&self, race_event_id: &str, race: &NewRace)
    -> Result<RaceRow, DataError>;

    async fn get_race(&self, id: &str) -> Result<Option<RaceRow>, DataError>;

    async fn list_races(&self, race_event_id: Option<&str>) -> Result<Vec<RaceRow>, DataError>;

    async fn update_race(&self, id: &str, race: &NewRace) -> Result<Option<RaceRow>, DataError>;

    async fn delete_race(&self, id: &str) -> Result<bool, DataError>;

    // ==================== Organizer & Competition Operations ====================

    async fn create_organizer(&self, organizer: &NewOrganizer) -> Result<OrganizerRow, DataError>;

    async fn get_organizer(&self, id: &str) -> Result<Option<OrganizerRow>, DataError>;

    async fn list_organizers(&self) -> Result<Vec<OrganizerRow>, DataError>;

    async fn create_competition(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<CompetitionRow, DataError>;

    async fn get_competition(&self, id: &str) -> Result<Option<CompetitionRow>, DataError>;

    async fn list_competitions(&self) -> Result<Vec<CompetitionRow>, DataError>;

    // ==================== Timing Operations ====================

    /// Register a participant; `Conflict` if the RFID tag is taken
    async fn create_participant(
        &self,
        name: &str,
        rfid_tag: &str,
    ) -> Result<ParticipantRow, DataError>;

    async fn list_participants(&self) -> Result<Vec<ParticipantRow>, DataError>;

    async fn create_checkpoint(&self, name: &str, location: &str)
    -> Result<CheckpointRow, DataError>;

    async fn list_checkpoints(&self) -> Result<Vec<CheckpointRow>, DataError>;

    /// Record a timing; `InvalidReference` if any referenced record is missing
    async fn create_timing(
        &self,
        participant_id: &str,
        checkpoint_id: &str,
        race_id: &str,
        timestamp: i64,
    ) -> Result<TimingRow, DataError>;

    async fn list_timings(&self) -> Result<Vec<TimingWithRelations>, DataError>;
}
