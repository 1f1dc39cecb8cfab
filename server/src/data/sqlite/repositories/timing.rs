//! Timing repository for SQLite operations
//!
//! A timing is one participant passing one checkpoint during one race.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::checkpoint::row_to_checkpoint;
use super::participant::row_to_participant;
use super::race::row_to_race;
use crate::data::sqlite::SqliteError;
use crate::data::types::{TimingRow, TimingWithRelations};

pub async fn create_timing(
    pool: &SqlitePool,
    participant_id: &str,
    checkpoint_id: &str,
    race_id: &str,
    timestamp: i64,
) -> Result<TimingRow, SqliteError> {
    let id = cuid2::create_id();

    sqlx::query(
        "INSERT INTO timings (id, participant_id, checkpoint_id, race_id, timestamp) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(participant_id)
    .bind(checkpoint_id)
    .bind(race_id)
    .bind(timestamp)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, "Timing"))?;

    Ok(TimingRow {
        id,
        participant_id: participant_id.to_string(),
        checkpoint_id: checkpoint_id.to_string(),
        race_id: race_id.to_string(),
        timestamp,
    })
}

/// All timing records with participant, checkpoint and race, in time order
pub async fn list_timings(pool: &SqlitePool) -> Result<Vec<TimingWithRelations>, SqliteError> {
    let rows = sqlx::query(
        r#"
        SELECT
            t.id, t.participant_id, t.checkpoint_id, t.race_id, t.timestamp,
            p.name AS p_name, p.rfid_tag AS p_rfid_tag, p.created_at AS p_created_at,
            c.name AS c_name, c.location AS c_location, c.created_at AS c_created_at,
            r.race_event_id AS r_race_event_id, r.name AS r_name, r.elevation AS r_elevation,
            r.length AS r_length, r.start_location AS r_start_location,
            r.start_date_time AS r_start_date_time, r.end_date_time AS r_end_date_time,
            r.gps_file AS r_gps_file, r.competition_id AS r_competition_id
        FROM timings t
        JOIN participants p ON p.id = t.participant_id
        JOIN checkpoints c ON c.id = t.checkpoint_id
        JOIN races r ON r.id = t.race_id
        ORDER BY t.timestamp ASC, t.id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(row_to_timing_with_relations)
        .collect::<Result<Vec<_>, sqlx::Error>>()
        .map_err(Into::into)
}

fn row_to_timing_with_relations(row: &SqliteRow) -> Result<TimingWithRelations, sqlx::Error> {
    let timing = TimingRow {
        id: row.try_get("id")?,
        participant_id: row.try_get("participant_id")?,
        checkpoint_id: row.try_get("checkpoint_id")?,
        race_id: row.try_get("race_id")?,
        timestamp: row.try_get("timestamp")?,
    };

    let participant = row_to_participant((
        timing.participant_id.clone(),
        row.try_get("p_name")?,
        row.try_get("p_rfid_tag")?,
        row.try_get("p_created_at")?,
    ));

    let checkpoint = row_to_checkpoint((
        timing.checkpoint_id.clone(),
        row.try_get("c_name")?,
        row.try_get("c_location")?,
        row.try_get("c_created_at")?,
    ));

    let race = row_to_race((
        timing.race_id.clone(),
        row.try_get("r_race_event_id")?,
        row.try_get("r_name")?,
        row.try_get("r_elevation")?,
        row.try_get("r_length")?,
        row.try_get("r_start_location")?,
        row.try_get("r_start_date_time")?,
        row.try_get("r_end_date_time")?,
        row.try_get("r_gps_file")?,
        row.try_get("r_competition_id")?,
    ));

    Ok(TimingWithRelations {
        timing,
        participant,
        checkpoint,
        race,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{
        checkpoint::create_checkpoint, participant::create_participant, race::create_race,
        setup_test_pool,
    };
    use crate::data::types::NewRace;

    #[tokio::test]
    async fn test_create_and_list_timings_with_relations() {
        let pool = setup_test_pool().await;
        sqlx::query(
            "INSERT INTO race_events (id, event_name, slug, created_at, updated_at) VALUES ('ev1', 'Event', 'event-2025', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        let race = create_race(
            &pool,
            "ev1",
            &NewRace {
                length: 10.0,
                start_date_time: 1_000,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let runner = create_participant(&pool, "Ana", "RFID-1").await.unwrap();
        let finish = create_checkpoint(&pool, "Finish", "Stadium").await.unwrap();

        create_timing(&pool, &runner.id, &finish.id, &race.id, 4_600)
            .await
            .unwrap();
        create_timing(&pool, &runner.id, &finish.id, &race.id, 4_500)
            .await
            .unwrap();

        let timings = list_timings(&pool).await.unwrap();
        assert_eq!(timings.len(), 2);
        assert_eq!(timings[0].timing.timestamp, 4_500);
        assert_eq!(timings[0].participant.rfid_tag, "RFID-1");
        assert_eq!(timings[0].checkpoint.location, "Stadium");
        assert_eq!(timings[0].race.length, 10.0);
    }

    #[tokio::test]
    async fn test_timing_with_unknown_participant_is_invalid_reference() {
        let pool = setup_test_pool().await;
        let result = create_timing(&pool, "nobody", "nowhere", "norace", 1).await;
        assert!(matches!(result, Err(SqliteError::InvalidReference(_))));
    }
}
