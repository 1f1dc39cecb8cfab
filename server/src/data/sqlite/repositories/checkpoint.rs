//! Checkpoint repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::CheckpointRow;

type CheckpointTuple = (String, String, String, i64);

pub(super) fn row_to_checkpoint((id, name, location, created_at): CheckpointTuple) -> CheckpointRow {
    CheckpointRow {
        id,
        name,
        location,
        created_at,
    }
}

pub async fn create_checkpoint(
    pool: &SqlitePool,
    name: &str,
    location: &str,
) -> Result<CheckpointRow, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    sqlx::query("INSERT INTO checkpoints (id, name, location, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(location)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| SqliteError::from_write(e, "Checkpoint"))?;

    Ok(CheckpointRow {
        id,
        name: name.to_string(),
        location: location.to_string(),
        created_at: now,
    })
}

pub async fn list_checkpoints(pool: &SqlitePool) -> Result<Vec<CheckpointRow>, SqliteError> {
    let rows = sqlx::query_as::<_, CheckpointTuple>(
        "SELECT id, name, location, created_at FROM checkpoints ORDER BY created_at ASC, name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_checkpoint).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::setup_test_pool;

    #[tokio::test]
    async fn test_create_and_list_checkpoints() {
        let pool = setup_test_pool().await;
        create_checkpoint(&pool, "Start", "Main square").await.unwrap();
        create_checkpoint(&pool, "Finish", "Stadium").await.unwrap();

        let all = list_checkpoints(&pool).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|c| c.location == "Stadium"));
    }
}
