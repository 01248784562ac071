use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::user::{self, Role};

/// A startup is the tenant every idea, vote and comment belongs to.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Startup {
    pub id: i64,
    pub name: String,
    pub domain: Option<String>,
    pub stage: Option<String>,
    pub join_code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewStartupRequest {
    #[serde(default)]
    pub name: String,
    pub domain: Option<String>,
    pub stage: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinStartupRequest {
    #[serde(default)]
    pub join_code: String,
}

/// Six random bytes, hex encoded, shared by founders with their team.
fn generate_join_code() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 6] = rng.random();
    hex::encode(bytes)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Create a startup and make `founder_id` its founder, in one transaction.
pub async fn found(
    pool: &PgPool,
    founder_id: i64,
    request: &NewStartupRequest,
) -> Result<Startup, AppError> {
    let mut tx = pool.begin().await?;

    let startup = sqlx::query_as::<_, Startup>(
        "INSERT INTO startups (name, domain, stage, join_code) VALUES ($1, $2, $3, $4) \
         RETURNING id, name, domain, stage, join_code, created_at",
    )
    .bind(request.name.trim())
    .bind(non_empty(request.domain.as_deref()))
    .bind(non_empty(request.stage.as_deref()))
    .bind(generate_join_code())
    .fetch_one(&mut *tx)
    .await?;

    user::assign_startup(&mut *tx, founder_id, startup.id, Role::Founder).await?;
    tx.commit().await?;

    log::info!("Startup #{} '{}' founded by user #{founder_id}", startup.id, startup.name);
    Ok(startup)
}

/// Join an existing startup as a member.
pub async fn join(pool: &PgPool, user_id: i64, join_code: &str) -> Result<Startup, AppError> {
    let startup = find_by_join_code(pool, join_code)
        .await?
        .ok_or(AppError::NotFound("Startup"))?;
    user::assign_startup(pool, user_id, startup.id, Role::Member).await?;
    log::info!("User #{user_id} joined startup #{}", startup.id);
    Ok(startup)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Startup>, AppError> {
    let startup = sqlx::query_as::<_, Startup>(
        "SELECT id, name, domain, stage, join_code, created_at FROM startups WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(startup)
}

pub async fn find_by_join_code(pool: &PgPool, join_code: &str) -> Result<Option<Startup>, AppError> {
    let startup = sqlx::query_as::<_, Startup>(
        "SELECT id, name, domain, stage, join_code, created_at FROM startups WHERE join_code = $1",
    )
    .bind(join_code.trim().to_lowercase())
    .fetch_optional(pool)
    .await?;
    Ok(startup)
}
