//! Race event repository for SQLite operations
//!
//! Events are always returned with their races. Creating or replacing the
//! races of an event happens in the same transaction as the event write.

use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use super::race::{insert_race, list_for_events, list_races};
use crate::data::sqlite::SqliteError;
use crate::data::sqlite::filters::{EVENT_ALIAS, push_race_event_filters};
use crate::data::types::{
    ListRaceEventsParams, NewRace, NewRaceEvent, RaceEventRow, RaceEventWithRaces,
};
use crate::utils::sql::escape_like_pattern;

type EventTuple = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    i64,
    i64,
);

const EVENT_COLUMNS: &[&str] = &[
    "id",
    "event_name",
    "slug",
    "description",
    "main_image",
    "gallery",
    "organizer_id",
    "contact_phone",
    "contact_email",
    "organizer_site",
    "registration_site",
    "social_media",
    "tags",
    "created_at",
    "updated_at",
];

fn event_columns(alias: Option<&str>) -> String {
    match alias {
        Some(alias) => EVENT_COLUMNS
            .iter()
            .map(|c| format!("{}.{}", alias, c))
            .collect::<Vec<_>>()
            .join(", "),
        None => EVENT_COLUMNS.join(", "),
    }
}

fn row_to_event(
    (
        id,
        event_name,
        slug,
        description,
        main_image,
        gallery,
        organizer_id,
        contact_phone,
        contact_email,
        organizer_site,
        registration_site,
        social_media,
        tags,
        created_at,
        updated_at,
    ): EventTuple,
) -> RaceEventRow {
    RaceEventRow {
        gallery: parse_string_array(&id, &gallery),
        tags: parse_string_array(&id, &tags),
        id,
        event_name,
        slug,
        description,
        main_image,
        organizer_id,
        contact_phone,
        contact_email,
        organizer_site,
        registration_site,
        social_media,
        created_at,
        updated_at,
    }
}

fn parse_string_array(event_id: &str, raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(%event_id, error = %e, "Malformed JSON array column, using empty list");
        Vec::new()
    })
}

fn encode_string_array(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// First free slug among `base`, `base-2`, `base-3`, ...
async fn next_available_slug<'e, E>(executor: E, base: &str) -> Result<String, SqliteError>
where
    E: SqliteExecutor<'e>,
{
    let pattern = format!("{}-%", escape_like_pattern(base));
    let taken: Vec<String> = sqlx::query_scalar(
        "SELECT slug FROM race_events WHERE slug = ? OR slug LIKE ? ESCAPE '\\'",
    )
    .bind(base)
    .bind(&pattern)
    .fetch_all(executor)
    .await?;

    if !taken.iter().any(|s| s == base) {
        return Ok(base.to_string());
    }

    let prefix = format!("{}-", base);
    let highest = taken
        .iter()
        .filter_map(|s| s.strip_prefix(&prefix))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(1);

    Ok(format!("{}-{}", base, highest.max(1) + 1))
}

/// Create a race event and its races atomically
///
/// `base_slug` is made unique by appending `-2`, `-3`, ... when taken.
pub async fn create_race_event(
    pool: &SqlitePool,
    base_slug: &str,
    event: &NewRaceEvent,
    races: &[NewRace],
) -> Result<RaceEventWithRaces, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;

    let slug = next_available_slug(&mut *tx, base_slug).await?;

    sqlx::query(&format!(
        "INSERT INTO race_events ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        event_columns(None)
    ))
    .bind(&id)
    .bind(&event.event_name)
    .bind(&slug)
    .bind(&event.description)
    .bind(&event.main_image)
    .bind(encode_string_array(&event.gallery))
    .bind(&event.organizer_id)
    .bind(&event.contact_phone)
    .bind(&event.contact_email)
    .bind(&event.organizer_site)
    .bind(&event.registration_site)
    .bind(&event.social_media)
    .bind(encode_string_array(&event.tags))
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| SqliteError::from_write(e, "Race event"))?;

    let mut created_races = Vec::with_capacity(races.len());
    for race in races {
        created_races.push(insert_race(&mut *tx, &id, race).await?);
    }

    tx.commit().await?;

    created_races.sort_by_key(|r| r.start_date_time);
    tracing::debug!(%id, %slug, races = created_races.len(), "Race event created");

    Ok(RaceEventWithRaces {
        event: RaceEventRow {
            id,
            event_name: event.event_name.clone(),
            slug,
            description: event.description.clone(),
            main_image: event.main_image.clone(),
            gallery: event.gallery.clone(),
            organizer_id: event.organizer_id.clone(),
            contact_phone: event.contact_phone.clone(),
            contact_email: event.contact_email.clone(),
            organizer_site: event.organizer_site.clone(),
            registration_site: event.registration_site.clone(),
            social_media: event.social_media.clone(),
            tags: event.tags.clone(),
            created_at: now,
            updated_at: now,
        },
        races: created_races,
    })
}

async fn with_races(
    pool: &SqlitePool,
    row: Option<EventTuple>,
) -> Result<Option<RaceEventWithRaces>, SqliteError> {
    match row {
        Some(row) => {
            let event = row_to_event(row);
            let races = list_races(pool, Some(&event.id)).await?;
            Ok(Some(RaceEventWithRaces { event, races }))
        }
        None => Ok(None),
    }
}

/// Get a race event with its races by ID
pub async fn get_race_event(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<RaceEventWithRaces>, SqliteError> {
    let row = sqlx::query_as::<_, EventTuple>(&format!(
        "SELECT {} FROM race_events WHERE id = ?",
        event_columns(None)
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    with_races(pool, row).await
}

/// Get a race event with its races by slug
pub async fn get_by_slug(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<RaceEventWithRaces>, SqliteError> {
    let row = sqlx::query_as::<_, EventTuple>(&format!(
        "SELECT {} FROM race_events WHERE slug = ?",
        event_columns(None)
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    with_races(pool, row).await
}

/// Search race events with filters, sorting and pagination
///
/// Returns the requested page and the total number of matching events.
pub async fn list_race_events(
    pool: &SqlitePool,
    params: &ListRaceEventsParams,
) -> Result<(Vec<RaceEventWithRaces>, u64), SqliteError> {
    let from = format!("FROM race_events {} WHERE 1=1", EVENT_ALIAS);

    let mut count_qb = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) {}", from));
    push_race_event_filters(&mut count_qb, &params.filter)?;
    let total: i64 = count_qb
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} {}",
        event_columns(Some(EVENT_ALIAS)),
        from
    ));
    push_race_event_filters(&mut qb, &params.filter)?;

    let direction = params.order.as_sql();
    qb.push(format!(
        " ORDER BY {alias}.{col} {dir}, {alias}.id {dir} LIMIT ",
        alias = EVENT_ALIAS,
        col = params.sort_by.column(),
        dir = direction
    ));
    let offset = (params.page.saturating_sub(1) as i64) * params.limit as i64;
    qb.push_bind(params.limit as i64);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build_query_as::<EventTuple>().fetch_all(pool).await?;
    let events: Vec<RaceEventRow> = rows.into_iter().map(row_to_event).collect();

    let ids: Vec<String> = events.iter().map(|e| e.id.clone()).collect();
    let mut races = list_for_events(pool, &ids).await?;

    let items = events
        .into_iter()
        .map(|event| RaceEventWithRaces {
            races: races.remove(&event.id).unwrap_or_default(),
            event,
        })
        .collect();

    Ok((items, total as u64))
}

/// Replace a race event's fields. When `races` is given, the event's races
/// are deleted and recreated from it. Returns `None` if the event is missing.
pub async fn update_race_event(
    pool: &SqlitePool,
    id: &str,
    event: &NewRaceEvent,
    races: Option<&[NewRace]>,
) -> Result<Option<RaceEventWithRaces>, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE race_events
        SET event_name = ?, description = ?, main_image = ?, gallery = ?, organizer_id = ?,
            contact_phone = ?, contact_email = ?, organizer_site = ?, registration_site = ?,
            social_media = ?, tags = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&event.event_name)
    .bind(&event.description)
    .bind(&event.main_image)
    .bind(encode_string_array(&event.gallery))
    .bind(&event.organizer_id)
    .bind(&event.contact_phone)
    .bind(&event.contact_email)
    .bind(&event.organizer_site)
    .bind(&event.registration_site)
    .bind(&event.social_media)
    .bind(encode_string_array(&event.tags))
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| SqliteError::from_write(e, "Race event"))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    if let Some(races) = races {
        sqlx::query("DELETE FROM races WHERE race_event_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for race in races {
            insert_race(&mut *tx, id, race).await?;
        }
    }

    tx.commit().await?;

    get_race_event(pool, id).await
}

/// Delete a race event and its races. Returns true if it existed.
pub async fn delete_race_event(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM race_events WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
