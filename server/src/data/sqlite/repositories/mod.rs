//! SQLite repositories
//!
//! Types (RaceEventRow, RaceRow, etc.) should be imported from `crate::data::types`.

pub mod checkpoint;
pub mod competition;
pub mod organizer;
pub mod participant;
pub mod race;
pub mod race_event;
pub mod timing;
pub mod user;

pub use checkpoint::{create_checkpoint, list_checkpoints};
pub use competition::{create_competition, get_competition, list_competitions};
pub use organizer::{create_organizer, get_organizer, list_organizers};
pub use participant::{create_participant, list_participants};
pub use race::{create_race, delete_race, get_race, list_races, update_race};
pub use race_event::{
    create_race_event, delete_race_event, get_by_slug as get_race_event_by_slug, get_race_event,
    list_race_events, update_race_event,
};
pub use timing::{create_timing, list_timings};
pub use user::{create_user, get_by_email as get_user_by_email, get_user};

/// In-memory pool with the full schema applied
#[cfg(test)]
pub async fn setup_test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::SqlitePool::connect(":memory:").await.unwrap();
    sqlx::query(crate::data::sqlite::schema::SCHEMA)
        .execute(&pool)
        .await
        .unwrap();
    pool
}
