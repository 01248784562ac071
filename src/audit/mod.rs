use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{PgExecutor, PgPool};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub target_type: String,
    pub target_id: i64,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

/// Append one audit entry. `user_id` is `None` for system actions (background analysis).
pub async fn log<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Option<i64>,
    action: &str,
    target_type: &str,
    target_id: i64,
    details: Value,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO audit_log (user_id, action, target_type, target_id, details) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(action)
    .bind(target_type)
    .bind(target_id)
    .bind(details)
    .execute(executor)
    .await?;
    Ok(())
}

/// Log an audit entry from a handler; a failed write is reported but never fails the request.
pub async fn record(
    pool: &PgPool,
    user_id: Option<i64>,
    action: &str,
    target_type: &str,
    target_id: i64,
    details: Value,
) {
    if let Err(e) = log(pool, user_id, action, target_type, target_id, details).await {
        log::warn!("Audit write failed for {action} on {target_type} #{target_id}: {e}");
    }
}

/// Entries for one target, newest first.
pub async fn find_for_target(
    pool: &PgPool,
    target_type: &str,
    target_id: i64,
) -> Result<Vec<AuditEntry>, AppError> {
    let entries = sqlx::query_as::<_, AuditEntry>(
        "SELECT id, user_id, action, target_type, target_id, details, created_at \
         FROM audit_log WHERE target_type = $1 AND target_id = $2 \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(target_type)
    .bind(target_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

/// Drop entries older than the retention window. Returns how many rows were removed.
pub async fn cleanup_old_entries(pool: &PgPool, retention_days: i64) -> Result<u64, AppError> {
    let result = sqlx::query(
        "DELETE FROM audit_log WHERE created_at < now() - make_interval(days => $1::int)",
    )
    .bind(retention_days)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
