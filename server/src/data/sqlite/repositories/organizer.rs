//! Organizer repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{NewOrganizer, OrganizerRow};

type OrganizerTuple = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
);

fn row_to_organizer(
    (id, name, contact_email, contact_phone, website, created_at): OrganizerTuple,
) -> OrganizerRow {
    OrganizerRow {
        id,
        name,
        contact_email,
        contact_phone,
        website,
        created_at,
    }
}

pub async fn create_organizer(
    pool: &SqlitePool,
    organizer: &NewOrganizer,
) -> Result<OrganizerRow, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO organizers (id, name, contact_email, contact_phone, website, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&organizer.name)
    .bind(&organizer.contact_email)
    .bind(&organizer.contact_phone)
    .bind(&organizer.website)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, "Organizer"))?;

    Ok(OrganizerRow {
        id,
        name: organizer.name.clone(),
        contact_email: organizer.contact_email.clone(),
        contact_phone: organizer.contact_phone.clone(),
        website: organizer.website.clone(),
        created_at: now,
    })
}

pub async fn get_organizer(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<OrganizerRow>, SqliteError> {
    let row = sqlx::query_as::<_, OrganizerTuple>(
        "SELECT id, name, contact_email, contact_phone, website, created_at FROM organizers WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_organizer))
}

/// List all organizers by name
pub async fn list_organizers(pool: &SqlitePool) -> Result<Vec<OrganizerRow>, SqliteError> {
    let rows = sqlx::query_as::<_, OrganizerTuple>(
        "SELECT id, name, contact_email, contact_phone, website, created_at FROM organizers ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_organizer).collect())
}
