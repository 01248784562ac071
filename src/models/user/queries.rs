use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::db::decode_text;
use crate::errors::AppError;
use super::types::*;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    startup_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: decode_text("role", &row.role)?,
            startup_id: row.startup_id,
            created_at: row.created_at,
        })
    }
}

const SELECT_USER: &str =
    "SELECT id, name, email, password_hash, role, startup_id, created_at FROM users";

/// Create a user without a startup. Returns the new id.
/// A taken email (case-insensitive) is a validation error, also when two signups race.
pub async fn create(pool: &PgPool, new_user: &NewUser) -> Result<i64, AppError> {
    sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(new_user.name.trim())
    .bind(new_user.email.trim())
    .bind(&new_user.password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Validation("User already exists".to_string())
        }
        other => AppError::from(other),
    })
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(User::try_from).transpose()
}

/// Email lookup is case-insensitive.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE LOWER(email) = LOWER($1)"))
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;
    row.map(User::try_from).transpose()
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
            .bind(email.trim())
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Attach a user to a startup with the given role.
pub async fn assign_startup<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: i64,
    startup_id: i64,
    role: Role,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE users SET startup_id = $1, role = $2 WHERE id = $3")
        .bind(startup_id)
        .bind(role.as_str())
        .bind(user_id)
        .execute(executor)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User"));
    }
    Ok(())
}
