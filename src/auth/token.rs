//! Opaque bearer tokens stored in `api_tokens`.

use std::time::Duration;

use rand::Rng;
use sqlx::PgPool;

use crate::auth::session::Actor;
use crate::db::decode_text;
use crate::errors::AppError;

/// Generate a random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Issue a new token for `user_id`, valid for `ttl`.
pub async fn issue(pool: &PgPool, user_id: i64, ttl: Duration) -> Result<String, AppError> {
    let token = generate_token();
    sqlx::query(
        "INSERT INTO api_tokens (token, user_id, expires_at) \
         VALUES ($1, $2, now() + make_interval(secs => $3))",
    )
    .bind(&token)
    .bind(user_id)
    .bind(ttl.as_secs_f64())
    .execute(pool)
    .await?;
    Ok(token)
}

#[derive(sqlx::FromRow)]
struct TokenOwner {
    id: i64,
    name: String,
    role: String,
    startup_id: Option<i64>,
}

/// The caller behind an unexpired token. Role and startup are read fresh on every request.
pub async fn resolve(pool: &PgPool, token: &str) -> Result<Option<Actor>, AppError> {
    let owner = sqlx::query_as::<_, TokenOwner>(
        "SELECT u.id, u.name, u.role, u.startup_id \
         FROM api_tokens t JOIN users u ON u.id = t.user_id \
         WHERE t.token = $1 AND t.expires_at > now()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    owner
        .map(|o| {
            Ok(Actor {
                user_id: o.id,
                name: o.name,
                role: decode_text("role", &o.role)?,
                startup_id: o.startup_id,
            })
        })
        .transpose()
}

pub async fn revoke(pool: &PgPool, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM api_tokens WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Drop expired tokens. Returns how many were removed.
pub async fn purge_expired(pool: &PgPool) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM api_tokens WHERE expires_at <= now()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_64_hex_chars_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
