//! Participant repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::ParticipantRow;

type ParticipantTuple = (String, String, String, i64);

pub(super) fn row_to_participant((id, name, rfid_tag, created_at): ParticipantTuple) -> ParticipantRow {
    ParticipantRow {
        id,
        name,
        rfid_tag,
        created_at,
    }
}

/// Register a participant. RFID tags are unique.
pub async fn create_participant(
    pool: &SqlitePool,
    name: &str,
    rfid_tag: &str,
) -> Result<ParticipantRow, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    sqlx::query("INSERT INTO participants (id, name, rfid_tag, created_at) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(rfid_tag)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| SqliteError::from_write(e, "Participant"))?;

    Ok(ParticipantRow {
        id,
        name: name.to_string(),
        rfid_tag: rfid_tag.to_string(),
        created_at: now,
    })
}

pub async fn list_participants(pool: &SqlitePool) -> Result<Vec<ParticipantRow>, SqliteError> {
    let rows = sqlx::query_as::<_, ParticipantTuple>(
        "SELECT id, name, rfid_tag, created_at FROM participants ORDER BY created_at ASC, name ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(row_to_participant).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::setup_test_pool;

    #[tokio::test]
    async fn test_create_and_list_participants() {
        let pool = setup_test_pool().await;
        let p = create_participant(&pool, "Ana", "RFID-001").await.unwrap();
        assert_eq!(p.rfid_tag, "RFID-001");

        let all = list_participants(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, p.id);
    }

    #[tokio::test]
    async fn test_duplicate_rfid_tag_is_conflict() {
        let pool = setup_test_pool().await;
        create_participant(&pool, "Ana", "RFID-001").await.unwrap();
        let result = create_participant(&pool, "Ben", "RFID-001").await;
        assert!(matches!(result, Err(SqliteError::Conflict(_))));
    }
}
