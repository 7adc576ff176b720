use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub age: Option<i32>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub async fn find_active_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, is_active, created_at, updated_at
            FROM users
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_active_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, is_active, created_at, updated_at
            FROM users
            WHERE email = $1 AND is_active = TRUE
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Lookup ignoring the soft-delete flag; used for status toggling and
    /// permanent deletion.
    pub async fn find_by_id_any_status(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Lookup ignoring the soft-delete flag; uniqueness spans inactive rows,
    /// so a deleted user's email stays reserved.
    pub async fn find_by_email_any_status(
        db: &PgPool,
        email: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, is_active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn list_active(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, is_active, created_at, updated_at
            FROM users
            WHERE is_active = TRUE
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    /// Case-insensitive substring match on name or email, active users only.
    pub async fn search_active(db: &PgPool, query: &str) -> anyhow::Result<Vec<User>> {
        let pattern = format!("%{}%", query);
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, is_active, created_at, updated_at
            FROM users
            WHERE (name ILIKE $1 OR email ILIKE $1) AND is_active = TRUE
            ORDER BY created_at ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn insert(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        age: Option<i32>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, age)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, age, is_active, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(age)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Writes every mutable column in one statement and stamps `updated_at`.
    pub async fn update_row(
        db: &PgPool,
        id: Uuid,
        name: &str,
        email: &str,
        password_hash: &str,
        age: Option<i32>,
        is_active: bool,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, age = $5, is_active = $6,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, password_hash, age, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(age)
        .bind(is_active)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn set_active_flag(
        db: &PgPool,
        id: Uuid,
        active: bool,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, password_hash, age, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(active)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn hard_delete(db: &PgPool, id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }
}
