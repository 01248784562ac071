use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::auth::policy::{self, Action};
use crate::auth::session::Actor;
use crate::auth::validate::{validate_rating, validate_required};
use crate::db::decode_text;
use crate::errors::AppError;
use crate::models::idea::VoteChoice;
use super::types::*;

pub const CONTENT_MAX_CHARS: usize = 5000;

#[derive(sqlx::FromRow)]
struct FeedbackRow {
    id: i64,
    idea_id: i64,
    startup_id: i64,
    submitted_by: Option<i64>,
    submitted_by_name: String,
    is_ai: bool,
    feedback_type: String,
    content: Option<String>,
    vote: Option<String>,
    rating: Option<i16>,
    is_board_member: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FeedbackRow {
    fn into_entry(self) -> Result<FeedbackEntry, AppError> {
        Ok(FeedbackEntry {
            id: self.id,
            idea_id: self.idea_id,
            submitted_by: self.submitted_by,
            submitted_by_name: self.submitted_by_name,
            is_ai: self.is_ai,
            feedback_type: decode_text("feedback_type", &self.feedback_type)?,
            content: self.content,
            vote: self.vote.as_deref().map(|v| decode_text("vote", v)).transpose()?,
            rating: self.rating,
            is_board_member: self.is_board_member,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_FEEDBACK: &str = "\
    SELECT f.id, f.idea_id, i.startup_id, f.submitted_by, f.submitted_by_name, f.is_ai, \
           f.feedback_type, f.content, f.vote, f.rating, f.is_board_member, \
           f.created_at, f.updated_at \
    FROM idea_feedback f \
    JOIN ideas i ON i.id = f.idea_id";

const RETURNING_FEEDBACK: &str = "\
    RETURNING id, idea_id, 0::BIGINT AS startup_id, submitted_by, submitted_by_name, is_ai, \
              feedback_type, content, vote, rating, is_board_member, created_at, updated_at";

/// Owning tenant of an idea, or `NotFound`.
async fn idea_tenant(pool: &PgPool, idea_id: i64) -> Result<i64, AppError> {
    sqlx::query_scalar("SELECT startup_id FROM ideas WHERE id = $1")
        .bind(idea_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Idea"))
}

/// Add a comment to an idea's thread.
pub async fn add_comment(
    pool: &PgPool,
    idea_id: i64,
    author: &Actor,
    content: &str,
    rating: Option<i16>,
) -> Result<FeedbackEntry, AppError> {
    let startup_id = idea_tenant(pool, idea_id).await?;
    policy::authorize(author, Action::AccessTenant { startup_id })?;

    let errors: Vec<String> = validate_required(content, "Content", CONTENT_MAX_CHARS)
        .into_iter()
        .chain(validate_rating(rating))
        .collect();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    let row = sqlx::query_as::<_, FeedbackRow>(&format!(
        "INSERT INTO idea_feedback \
             (idea_id, submitted_by, submitted_by_name, feedback_type, content, rating, is_board_member) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) {RETURNING_FEEDBACK}"
    ))
    .bind(idea_id)
    .bind(author.user_id)
    .bind(&author.name)
    .bind(FeedbackType::Comment.as_str())
    .bind(content.trim())
    .bind(rating)
    .bind(author.is_founder())
    .fetch_one(pool)
    .await?;
    row.into_entry()
}

/// The display thread: comments and AI analyses, newest first. Vote entries stay in storage.
pub async fn list_for_idea(pool: &PgPool, idea_id: i64) -> Result<Vec<FeedbackEntry>, AppError> {
    let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
        "{SELECT_FEEDBACK} WHERE f.idea_id = $1 AND f.feedback_type IN ('comment', 'ai-analysis') \
         ORDER BY f.created_at DESC, f.id DESC"
    ))
    .bind(idea_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(FeedbackRow::into_entry).collect()
}

/// Every entry of an idea, votes included, newest first.
pub async fn find_all_for_idea(pool: &PgPool, idea_id: i64) -> Result<Vec<FeedbackEntry>, AppError> {
    let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
        "{SELECT_FEEDBACK} WHERE f.idea_id = $1 ORDER BY f.created_at DESC, f.id DESC"
    ))
    .bind(idea_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(FeedbackRow::into_entry).collect()
}

async fn find_row(pool: &PgPool, id: i64) -> Result<FeedbackRow, AppError> {
    sqlx::query_as::<_, FeedbackRow>(&format!("{SELECT_FEEDBACK} WHERE f.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Feedback"))
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<FeedbackEntry, AppError> {
    find_row(pool, id).await?.into_entry()
}

/// Edit one's own comment. AI entries are immutable.
pub async fn update(
    pool: &PgPool,
    id: i64,
    actor: &Actor,
    patch: &FeedbackPatch,
) -> Result<FeedbackEntry, AppError> {
    let row = find_row(pool, id).await?;
    policy::authorize(
        actor,
        Action::EditFeedback { startup_id: row.startup_id, submitted_by: row.submitted_by, is_ai: row.is_ai },
    )?;

    let mut errors = Vec::new();
    if let Some(content) = &patch.content {
        errors.extend(validate_required(content, "Content", CONTENT_MAX_CHARS));
    }
    errors.extend(validate_rating(patch.rating));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    sqlx::query(
        "UPDATE idea_feedback SET content = COALESCE($1, content), rating = COALESCE($2, rating), \
         updated_at = clock_timestamp() WHERE id = $3",
    )
    .bind(patch.content.as_deref().map(str::trim))
    .bind(patch.rating)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id).await
}

/// Remove an entry: its author or a founder of the tenant may do so, never for AI entries.
pub async fn delete(pool: &PgPool, id: i64, actor: &Actor) -> Result<(), AppError> {
    let row = find_row(pool, id).await?;
    policy::authorize(
        actor,
        Action::DeleteFeedback { startup_id: row.startup_id, submitted_by: row.submitted_by, is_ai: row.is_ai },
    )?;

    sqlx::query("DELETE FROM idea_feedback WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    log::info!("Feedback #{id} deleted by user #{}", actor.user_id);
    Ok(())
}

/// Ledger entry for a vote; written inside the vote transaction.
pub async fn insert_vote_entry(
    conn: &mut PgConnection,
    idea_id: i64,
    voter: &Actor,
    choice: VoteChoice,
) -> Result<(), AppError> {
    let vote = match choice {
        VoteChoice::Upvote => FeedbackVote::Upvote,
        VoteChoice::Downvote => FeedbackVote::Downvote,
    };
    sqlx::query(
        "INSERT INTO idea_feedback \
             (idea_id, submitted_by, submitted_by_name, feedback_type, vote, is_board_member) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(idea_id)
    .bind(voter.user_id)
    .bind(&voter.name)
    .bind(FeedbackType::Vote.as_str())
    .bind(vote.as_str())
    .bind(voter.is_founder())
    .execute(conn)
    .await?;
    Ok(())
}

/// AI-authored thread entry. `rating` is on the analysis' 10-point scale.
pub async fn insert_ai_entry(
    conn: &mut PgConnection,
    idea_id: i64,
    content: &str,
    rating: i16,
) -> Result<FeedbackEntry, AppError> {
    let row = sqlx::query_as::<_, FeedbackRow>(&format!(
        "INSERT INTO idea_feedback \
             (idea_id, submitted_by, submitted_by_name, is_ai, feedback_type, content, rating) \
         VALUES ($1, NULL, $2, TRUE, $3, $4, $5) {RETURNING_FEEDBACK}"
    ))
    .bind(idea_id)
    .bind(AI_AUTHOR_NAME)
    .bind(FeedbackType::AiAnalysis.as_str())
    .bind(content)
    .bind(rating.clamp(1, 10))
    .fetch_one(conn)
    .await?;
    row.into_entry()
}
