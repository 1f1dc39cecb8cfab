//! Race repository for SQLite operations
//!
//! Races belong to exactly one race event and are deleted with it.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::types::{NewRace, RaceRow};

pub(super) type RaceTuple = (
    String,
    String,
    Option<String>,
    Option<f64>,
    f64,
    Option<String>,
    i64,
    Option<i64>,
    Option<String>,
    Option<String>,
);

pub(super) const RACE_COLUMNS: &str = "id, race_event_id, name, elevation, length, start_location, start_date_time, end_date_time, gps_file, competition_id";

pub(super) fn row_to_race(
    (
        id,
        race_event_id,
        name,
        elevation,
        length,
        start_location,
        start_date_time,
        end_date_time,
        gps_file,
        competition_id,
    ): RaceTuple,
) -> RaceRow {
    RaceRow {
        id,
        race_event_id,
        name,
        elevation,
        length,
        start_location,
        start_date_time,
        end_date_time,
        gps_file,
        competition_id,
    }
}

/// Insert a race on any executor (pool or open transaction)
pub(super) async fn insert_race<'e, E>(
    executor: E,
    race_event_id: &str,
    race: &NewRace,
) -> Result<RaceRow, SqliteError>
where
    E: SqliteExecutor<'e>,
{
    let id = cuid2::create_id();

    sqlx::query(&format!(
        "INSERT INTO races ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        RACE_COLUMNS
    ))
    .bind(&id)
    .bind(race_event_id)
    .bind(&race.name)
    .bind(race.elevation)
    .bind(race.length)
    .bind(&race.start_location)
    .bind(race.start_date_time)
    .bind(race.end_date_time)
    .bind(&race.gps_file)
    .bind(&race.competition_id)
    .execute(executor)
    .await
    .map_err(|e| SqliteError::from_write(e, "Race"))?;

    Ok(RaceRow {
        id,
        race_event_id: race_event_id.to_string(),
        name: race.name.clone(),
        elevation: race.elevation,
        length: race.length,
        start_location: race.start_location.clone(),
        start_date_time: race.start_date_time,
        end_date_time: race.end_date_time,
        gps_file: race.gps_file.clone(),
        competition_id: race.competition_id.clone(),
    })
}

/// Create a race under an existing race event
pub async fn create_race(
    pool: &SqlitePool,
    race_event_id: &str,
    race: &NewRace,
) -> Result<RaceRow, SqliteError> {
    insert_race(pool, race_event_id, race).await
}

pub async fn get_race(pool: &SqlitePool, id: &str) -> Result<Option<RaceRow>, SqliteError> {
    let row = sqlx::query_as::<_, RaceTuple>(&format!(
        "SELECT {} FROM races WHERE id = ?",
        RACE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_race))
}

/// List races ordered by start time, optionally scoped to one event
pub async fn list_races(
    pool: &SqlitePool,
    race_event_id: Option<&str>,
) -> Result<Vec<RaceRow>, SqliteError> {
    let rows = match race_event_id {
        Some(event_id) => {
            sqlx::query_as::<_, RaceTuple>(&format!(
                "SELECT {} FROM races WHERE race_event_id = ? ORDER BY start_date_time ASC",
                RACE_COLUMNS
            ))
            .bind(event_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, RaceTuple>(&format!(
                "SELECT {} FROM races ORDER BY start_date_time ASC",
                RACE_COLUMNS
            ))
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(row_to_race).collect())
}

/// Races for a set of events, grouped by event ID
pub(super) async fn list_for_events(
    pool: &SqlitePool,
    event_ids: &[String],
) -> Result<HashMap<String, Vec<RaceRow>>, SqliteError> {
    let mut grouped: HashMap<String, Vec<RaceRow>> = HashMap::new();
    if event_ids.is_empty() {
        return Ok(grouped);
    }

    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM races WHERE race_event_id IN (",
        RACE_COLUMNS
    ));
    {
        let mut separated = qb.separated(", ");
        for id in event_ids {
            separated.push_bind(id.clone());
        }
    }
    qb.push(") ORDER BY start_date_time ASC");

    let rows = qb.build_query_as::<RaceTuple>().fetch_all(pool).await?;
    for race in rows.into_iter().map(row_to_race) {
        grouped
            .entry(race.race_event_id.clone())
            .or_default()
            .push(race);
    }

    Ok(grouped)
}

/// Replace a race's fields. Returns the updated race if found.
pub async fn update_race(
    pool: &SqlitePool,
    id: &str,
    race: &NewRace,
) -> Result<Option<RaceRow>, SqliteError> {
    let result = sqlx::query(
        r#"
        UPDATE races
        SET name = ?, elevation = ?, length = ?, start_location = ?,
            start_date_time = ?, end_date_time = ?, gps_file = ?, competition_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&race.name)
    .bind(race.elevation)
    .bind(race.length)
    .bind(&race.start_location)
    .bind(race.start_date_time)
    .bind(race.end_date_time)
    .bind(&race.gps_file)
    .bind(&race.competition_id)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, "Race"))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_race(pool, id).await
}

/// Delete a race by ID. Returns true if a race was deleted.
pub async fn delete_race(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM races WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::setup_test_pool;

    async fn insert_event(pool: &SqlitePool, id: &str) {
        sqlx::query(
            "INSERT INTO race_events (id, event_name, slug, created_at, updated_at) VALUES (?, 'Event', ?, 0, 0)",
        )
        .bind(id)
        .bind(format!("event-{}", id))
        .execute(pool)
        .await
        .unwrap();
    }

    fn race(start: i64, length: f64) -> NewRace {
        NewRace {
            length,
            start_date_time: start,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_race() {
        let pool = setup_test_pool().await;
        insert_event(&pool, "ev1").await;

        let created = create_race(
            &pool,
            "ev1",
            &NewRace {
                name: Some("10K".into()),
                elevation: Some(120.0),
                end_date_time: Some(2_000),
                ..race(1_000, 10.0)
            },
        )
        .await
        .unwrap();

        let fetched = get_race(&pool, &created.id).await.unwrap().unwrap();
        assert_eq!(fetched.race_event_id, "ev1");
        assert_eq!(fetched.name.as_deref(), Some("10K"));
        assert_eq!(fetched.elevation, Some(120.0));
        assert_eq!(fetched.end_date_time, Some(2_000));
    }

    #[tokio::test]
    async fn test_create_race_for_missing_event_is_invalid_reference() {
        let pool = setup_test_pool().await;
        let result = create_race(&pool, "missing", &race(1_000, 5.0)).await;
        assert!(matches!(result, Err(SqliteError::InvalidReference(_))));
    }

    #[tokio::test]
    async fn test_list_races_scoped_and_ordered() {
        let pool = setup_test_pool().await;
        insert_event(&pool, "ev1").await;
        insert_event(&pool, "ev2").await;
        create_race(&pool, "ev1", &race(3_000, 42.2)).await.unwrap();
        create_race(&pool, "ev1", &race(1_000, 21.1)).await.unwrap();
        create_race(&pool, "ev2", &race(2_000, 5.0)).await.unwrap();

        let all = list_races(&pool, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].start_date_time, 1_000);

        let scoped = list_races(&pool, Some("ev1")).await.unwrap();
        assert_eq!(scoped.len(), 2);
        assert_eq!(scoped[0].length, 21.1);

        let grouped = list_for_events(&pool, &["ev1".into(), "ev2".into()])
            .await
            .unwrap();
        assert_eq!(grouped["ev1"].len(), 2);
        assert_eq!(grouped["ev2"].len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_race() {
        let pool = setup_test_pool().await;
        insert_event(&pool, "ev1").await;
        let created = create_race(&pool, "ev1", &race(1_000, 10.0)).await.unwrap();

        let updated = update_race(&pool, &created.id, &race(1_500, 15.0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.length, 15.0);
        assert_eq!(updated.start_date_time, 1_500);

        assert!(update_race(&pool, "missing", &race(1, 1.0)).await.unwrap().is_none());

        assert!(delete_race(&pool, &created.id).await.unwrap());
        assert!(!delete_race(&pool, &created.id).await.unwrap());
    }
}
