//! User repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{UserRole, UserRow};

type UserTuple = (String, String, String, String, i64, i64);

const USER_COLUMNS: &str = "id, email, password_hash, role, created_at, updated_at";

fn row_to_user(
    (id, email, password_hash, role, created_at, updated_at): UserTuple,
) -> UserRow {
    UserRow {
        id,
        email,
        password_hash,
        role: UserRole::parse_or_default(&role),
        created_at,
        updated_at,
    }
}

/// Create a new user with a generated CUID2 ID
///
/// Fails with `Conflict` when the email is already registered.
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> Result<UserRow, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, "User"))?;

    Ok(UserRow {
        id,
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        role,
        created_at: now,
        updated_at: now,
    })
}

/// Get a user by ID
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_user))
}

/// Get a user by email
pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::setup_test_pool;

    #[tokio::test]
    async fn test_create_user() {
        let pool = setup_test_pool().await;
        let user = create_user(&pool, "runner@example.com", "hash", UserRole::Organizer)
            .await
            .unwrap();

        assert!(!user.id.is_empty());
        assert_eq!(user.email, "runner@example.com");
        assert_eq!(user.role, UserRole::Organizer);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn test_get_user_and_by_email() {
        let pool = setup_test_pool().await;
        let created = create_user(&pool, "a@example.com", "hash", UserRole::Participant)
            .await
            .unwrap();

        let by_id = get_user(&pool, &created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@example.com");
        assert_eq!(by_id.password_hash, "hash");

        let by_email = get_by_email(&pool, "a@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(get_user(&pool, "nonexistent").await.unwrap().is_none());
        assert!(get_by_email(&pool, "b@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let pool = setup_test_pool().await;
        create_user(&pool, "dup@example.com", "hash", UserRole::Participant)
            .await
            .unwrap();
        let result = create_user(&pool, "dup@example.com", "hash", UserRole::Admin).await;
        assert!(matches!(result, Err(SqliteError::Conflict(_))));
    }
}
