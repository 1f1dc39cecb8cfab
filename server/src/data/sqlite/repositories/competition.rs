//! Competition repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::CompetitionRow;

type CompetitionTuple = (String, String, Option<String>, i64);

fn row_to_competition((id, name, description, created_at): CompetitionTuple) -> CompetitionRow {
    CompetitionRow {
        id,
        name,
        description,
        created_at,
    }
}

pub async fn create_competition(
    pool: &SqlitePool,
    name: &str,
    description: Option<&str>,
) -> Result<CompetitionRow, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    sqlx::query("INSERT INTO competitions (id, name, description, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(description)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| SqliteError::from_write(e, "Competition"))?;

    Ok(CompetitionRow {
        id,
        name: name.to_string(),
        description: description.map(String::from),
        created_at: now,
    })
}

pub async fn get_competition(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<CompetitionRow>, SqliteError> {
    let row = sqlx::query_as::<_, CompetitionTuple>(
        "SELECT id, name, description, created_at FROM competitions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_competition))
}

/// List all competitions, newest first
pub async fn list_competitions(pool: &SqlitePool) -> Result<Vec<CompetitionRow>, SqliteError> {
    let rows = sqlx::query_as::<_, CompetitionTuple>(
        "SELECT id, name, description, created_at FROM competitions ORDER BY created_at DESC, name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_competition).collect())
}
