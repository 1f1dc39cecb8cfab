//! TransactionalRepository trait implementation for SQLite
//!
//! Each method forwards to the matching free function in `repositories`
//! and lifts `SqliteError` into `DataError`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::TransactionalRepository;
use crate::data::types::{
    CheckpointRow, CompetitionRow, ListRaceEventsParams, NewOrganizer, NewRace, NewRaceEvent,
    OrganizerRow, ParticipantRow, RaceEventWithRaces, RaceRow, TimingRow, TimingWithRelations,
    UserRole, UserRow,
};

use super::SqliteService;
use super::repositories::{
    checkpoint, competition, organizer, participant, race, race_event, timing, user,
};

#[async_trait]
impl TransactionalRepository for Arc<SqliteService> {
    // ==================== User Operations ====================

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<UserRow, DataError> {
        user::create_user(self.pool(), email, password_hash, role)
            .await
            .map_err(Into::into)
    }

    async fn get_user(&self, id: &str) -> Result<Option<UserRow>, DataError> {
        user::get_user(self.pool(), id).await.map_err(Into::into)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DataError> {
        user::get_by_email(self.pool(), email)
            .await
            .map_err(Into::into)
    }

    // ==================== Race Event Operations ====================

    async fn create_race_event(
        &self,
        base_slug: &str,
        event: &NewRaceEvent,
        races: &[NewRace],
    ) -> Result<RaceEventWithRaces, DataError> {
        race_event::create_race_event(self.pool(), base_slug, event, races)
            .await
            .map_err(Into::into)
    }

    async fn get_race_event(&self, id: &str) -> Result<Option<RaceEventWithRaces>, DataError> {
        race_event::get_race_event(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn get_race_event_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<RaceEventWithRaces>, DataError> {
        race_event::get_by_slug(self.pool(), slug)
            .await
            .map_err(Into::into)
    }

    async fn list_race_events(
        &self,
        params: &ListRaceEventsParams,
    ) -> Result<(Vec<RaceEventWithRaces>, u64), DataError> {
        race_event::list_race_events(self.pool(), params)
            .await
            .map_err(Into::into)
    }

    async fn update_race_event(
        &self,
        id: &str,
        event: &NewRaceEvent,
        races: Option<&[NewRace]>,
    ) -> Result<Option<RaceEventWithRaces>, DataError> {
        race_event::update_race_event(self.pool(), id, event, races)
            .await
            .map_err(Into::into)
    }

    async fn delete_race_event(&self, id: &str) -> Result<bool, DataError> {
        race_event::delete_race_event(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    // ==================== Race Operations ====================

    async fn create_race(
        &self,
        race_event_id: &str,
        new_race: &NewRace,
    ) -> Result<RaceRow, DataError> {
        race::create_race(self.pool(), race_event_id, new_race)
            .await
            .map_err(Into::into)
    }

    async fn get_race(&self, id: &str) -> Result<Option<RaceRow>, DataError> {
        race::get_race(self.pool(), id).await.map_err(Into::into)
    }

    async fn list_races(&self, race_event_id: Option<&str>) -> Result<Vec<RaceRow>, DataError> {
        race::list_races(self.pool(), race_event_id)
            .await
            .map_err(Into::into)
    }

    async fn update_race(
        &self,
        id: &str,
        new_race: &NewRace,
    ) -> Result<Option<RaceRow>, DataError> {
        race::update_race(self.pool(), id, new_race)
            .await
            .map_err(Into::into)
    }

    async fn delete_race(&self, id: &str) -> Result<bool, DataError> {
        race::delete_race(self.pool(), id).await.map_err(Into::into)
    }

    // ==================== Organizer & Competition Operations ====================

    async fn create_organizer(
        &self,
        new_organizer: &NewOrganizer,
    ) -> Result<OrganizerRow, DataError> {
        organizer::create_organizer(self.pool(), new_organizer)
            .await
            .map_err(Into::into)
    }

    async fn get_organizer(&self, id: &str) -> Result<Option<OrganizerRow>, DataError> {
        organizer::get_organizer(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn list_organizers(&self) -> Result<Vec<OrganizerRow>, DataError> {
        organizer::list_organizers(self.pool())
            .await
            .map_err(Into::into)
    }

    async fn create_competition(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<CompetitionRow, DataError> {
        competition::create_competition(self.pool(), name, description)
            .await
            .map_err(Into::into)
    }

    async fn get_competition(&self, id: &str) -> Result<Option<CompetitionRow>, DataError> {
        competition::get_competition(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn list_competitions(&self) -> Result<Vec<CompetitionRow>, DataError> {
        competition::list_competitions(self.pool())
            .await
            .map_err(Into::into)
    }

    // ==================== Timing Operations ====================

    async fn create_participant(
        &self,
        name: &str,
        rfid_tag: &str,
    ) -> Result<ParticipantRow, DataError> {
        participant::create_participant(self.pool(), name, rfid_tag)
            .await
            .map_err(Into::into)
    }

    async fn list_participants(&self) -> Result<Vec<ParticipantRow>, DataError> {
        participant::list_participants(self.pool())
            .await
            .map_err(Into::into)
    }

    async fn create_checkpoint(
        &self,
        name: &str,
        location: &str,
    ) -> Result<CheckpointRow, DataError> {
        checkpoint::create_checkpoint(self.pool(), name, location)
            .await
            .map_err(Into::into)
    }

    async fn list_checkpoints(&self) -> Result<Vec<CheckpointRow>, DataError> {
        checkpoint::list_checkpoints(self.pool())
            .await
            .map_err(Into::into)
    }

    async fn create_timing(
        &self,
        participant_id: &str,
        checkpoint_id: &str,
        race_id: &str,
        timestamp: i64,
    ) -> Result<TimingRow, DataError> {
        timing::create_timing(
            self.pool(),
            participant_id,
            checkpoint_id,
            race_id,
            timestamp,
        )
        .await
        .map_err(Into::into)
    }

    async fn list_timings(&self) -> Result<Vec<TimingWithRelations>, DataError> {
        timing::list_timings(self.pool()).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> Arc<SqliteService> {
        Arc::new(SqliteService::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_errors_are_lifted_to_data_errors() {
        let repo = repo().await;
        repo.create_participant("Ana", "TAG").await.unwrap();

        let dup = repo.create_participant("Ben", "TAG").await;
        assert!(matches!(dup, Err(DataError::Conflict(_))));

        let orphan = repo.create_timing("x", "y", "z", 0).await;
        assert!(matches!(orphan, Err(DataError::InvalidReference(_))));
    }

    #[tokio::test]
    async fn test_race_event_roundtrip_through_trait() {
        let repo = repo().await;
        let created = repo
            .create_race_event(
                "spring-run-2025",
                &NewRaceEvent {
                    event_name: "Spring Run".into(),
                    ..Default::default()
                },
                &[NewRace {
                    length: 5.0,
                    start_date_time: 1_000,
                    ..Default::default()
                }],
            )
            .await
            .unwrap();

        let races = repo.list_races(Some(&created.event.id)).await.unwrap();
        assert_eq!(races.len(), 1);

        let (page, total) = repo
            .list_race_events(&ListRaceEventsParams::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].event.slug, "spring-run-2025");
    }
}
