use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::auth::policy::{self, Action};
use crate::auth::session::Actor;
use crate::db::decode_text;
use crate::errors::AppError;
use crate::models::feedback;
use super::ledger::{self, VotingLedger};
use super::types::*;
use super::workflow::{self, WorkflowChange};

#[derive(sqlx::FromRow)]
struct IdeaRow {
    id: i64,
    startup_id: i64,
    title: String,
    description: String,
    category: String,
    status: String,
    priority: String,
    tags: Vec<String>,
    ai_analysis: Option<Json<AiAnalysis>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    submitter_id: i64,
    submitter_name: String,
    submitter_email: String,
    submitter_role: String,
}

impl IdeaRow {
    fn into_idea(self, ledger: Option<&VotingLedger>) -> Result<Idea, AppError> {
        Ok(Idea {
            id: self.id,
            startup_id: self.startup_id,
            title: self.title,
            description: self.description,
            category: decode_text("category", &self.category)?,
            status: decode_text("status", &self.status)?,
            priority: decode_text("priority", &self.priority)?,
            tags: self.tags,
            submitted_by: Submitter {
                id: self.submitter_id,
                name: self.submitter_name,
                email: self.submitter_email,
                role: decode_text("role", &self.submitter_role)?,
            },
            voting_stats: ledger.map(VotingLedger::stats).unwrap_or_default(),
            ai_analysis: self.ai_analysis.map(|Json(a)| a),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_IDEA: &str = "\
    SELECT i.id, i.startup_id, i.title, i.description, i.category, i.status, i.priority, \
           i.tags, i.ai_analysis, i.created_at, i.updated_at, \
           u.id AS submitter_id, u.name AS submitter_name, u.email AS submitter_email, \
           u.role AS submitter_role \
    FROM ideas i \
    JOIN users u ON u.id = i.submitted_by";

/// Escape LIKE wildcards so user search text matches literally.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Create an idea in `tenant`, submitted by `submitter`. Status always starts as pending.
pub async fn create(
    pool: &PgPool,
    tenant: i64,
    submitter: &Actor,
    new_idea: &NewIdea,
) -> Result<Idea, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO ideas (startup_id, submitted_by, title, description, category, tags, priority, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
    )
    .bind(tenant)
    .bind(submitter.user_id)
    .bind(&new_idea.title)
    .bind(&new_idea.description)
    .bind(new_idea.category.as_str())
    .bind(&new_idea.tags)
    .bind(new_idea.priority.as_str())
    .bind(IdeaStatus::Pending.as_str())
    .fetch_one(pool)
    .await?;

    log::info!("Idea #{id} created in startup #{tenant} by user #{}", submitter.user_id);
    find_by_id(pool, id, tenant).await
}

/// Load one idea. `NotFound` if absent, `AccessDenied` if it belongs to another tenant.
pub async fn find_by_id(pool: &PgPool, id: i64, tenant: i64) -> Result<Idea, AppError> {
    let row = sqlx::query_as::<_, IdeaRow>(&format!("{SELECT_IDEA} WHERE i.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Idea"))?;
    policy::ensure_tenant(row.startup_id, tenant)?;

    let ledger = ledger::load(pool, id).await?;
    row.into_idea(Some(&ledger))
}

/// Ideas of one tenant, newest first.
pub async fn list(pool: &PgPool, tenant: i64, filter: &IdeaFilter) -> Result<Vec<Idea>, AppError> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_IDEA);
    qb.push(" WHERE i.startup_id = ").push_bind(tenant);
    if let Some(category) = filter.category {
        qb.push(" AND i.category = ").push_bind(category.as_str());
    }
    if let Some(status) = filter.status {
        qb.push(" AND i.status = ").push_bind(status.as_str());
    }
    if let Some(priority) = filter.priority {
        qb.push(" AND i.priority = ").push_bind(priority.as_str());
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (i.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR i.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    qb.push(" ORDER BY i.created_at DESC, i.id DESC");

    let rows = qb.build_query_as::<IdeaRow>().fetch_all(pool).await?;
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let ledgers = ledger::load_many(pool, &ids).await?;

    rows.into_iter()
        .map(|row| {
            let ledger = ledgers.get(&row.id);
            row.into_idea(ledger)
        })
        .collect()
}

/// Apply a patch. Authorization for status/priority runs before anything is written, and
/// the remaining fields are written by a single statement.
pub async fn update(
    pool: &PgPool,
    id: i64,
    tenant: i64,
    actor: &Actor,
    patch: &IdeaPatch,
) -> Result<(Idea, Option<WorkflowChange>), AppError> {
    let current = find_by_id(pool, id, tenant).await?;
    let change = workflow::check_patch(actor, &current, patch)?;

    let result = sqlx::query(
        "UPDATE ideas SET \
             title = COALESCE($1, title), \
             description = COALESCE($2, description), \
             category = COALESCE($3, category), \
             tags = COALESCE($4, tags), \
             status = COALESCE($5, status), \
             priority = COALESCE($6, priority), \
             updated_at = now() \
         WHERE id = $7 AND startup_id = $8",
    )
    .bind(patch.title.as_deref())
    .bind(patch.description.as_deref())
    .bind(patch.category.map(|c| c.as_str()))
    .bind(patch.tags.as_deref())
    .bind(patch.status.map(|s| s.as_str()))
    .bind(patch.priority.map(|p| p.as_str()))
    .bind(id)
    .bind(tenant)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Idea"));
    }

    if let Some(change) = &change {
        log::info!(
            "Idea #{id} workflow changed by user #{}: {} -> {}, priority {} -> {}",
            actor.user_id, change.status_from, change.status_to, change.priority_from, change.priority_to
        );
    }
    let idea = find_by_id(pool, id, tenant).await?;
    Ok((idea, change))
}

/// Delete an idea together with its ballots and feedback thread.
pub async fn delete(pool: &PgPool, id: i64, tenant: i64, actor: &Actor) -> Result<(), AppError> {
    let idea = find_by_id(pool, id, tenant).await?;
    policy::authorize(
        actor,
        Action::DeleteIdea { startup_id: idea.startup_id, submitted_by: idea.submitted_by.id },
    )?;

    sqlx::query("DELETE FROM ideas WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    log::info!("Idea #{id} deleted by user #{}", actor.user_id);
    Ok(())
}

/// Cast or change `voter`'s vote.
///
/// The idea row is locked for the whole transaction, so concurrent votes on the same idea
/// are applied one after another and the ballot upsert, the `updated_at` bump and the vote
/// feedback entry commit together.
pub async fn vote(
    pool: &PgPool,
    id: i64,
    tenant: i64,
    voter: &Actor,
    choice: VoteChoice,
) -> Result<Idea, AppError> {
    let mut tx = pool.begin().await?;

    let startup_id: i64 = sqlx::query_scalar("SELECT startup_id FROM ideas WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Idea"))?;
    policy::ensure_tenant(startup_id, tenant)?;

    let outcome = ledger::cast_locked(&mut tx, id, voter.user_id, choice, voter.is_founder()).await?;

    sqlx::query("UPDATE ideas SET updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    feedback::insert_vote_entry(&mut tx, id, voter, choice).await?;
    tx.commit().await?;

    log::info!(
        "User #{} voted {} on idea #{id} (previous: {})",
        voter.user_id,
        outcome.current.choice,
        outcome.previous.map(|b| b.choice.as_str()).unwrap_or("none")
    );
    find_by_id(pool, id, tenant).await
}

/// Store an analysis result, replacing any earlier one.
pub async fn set_analysis(conn: &mut PgConnection, id: i64, analysis: &AiAnalysis) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE ideas SET ai_analysis = $1, updated_at = now() WHERE id = $2")
        .bind(Json(analysis))
        .bind(id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Idea"));
    }
    Ok(())
}
