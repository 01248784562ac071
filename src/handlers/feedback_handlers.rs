use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::PgPool;

use crate::audit;
use crate::auth::session::Actor;
use crate::errors::AppError;
use crate::models::feedback::{self, CommentRequest, FeedbackPatch};
use crate::models::idea;

/// GET /api/ideas/{id}/feedback
pub async fn list(
    pool: web::Data<PgPool>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let tenant = actor.tenant()?;
    let idea_id = path.into_inner();
    idea::find_by_id(&pool, idea_id, tenant).await?;
    let entries = feedback::list_for_idea(&pool, idea_id).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// POST /api/ideas/{id}/feedback
pub async fn create(
    pool: web::Data<PgPool>,
    actor: Actor,
    path: web::Path<i64>,
    body: web::Json<CommentRequest>,
) -> Result<HttpResponse, AppError> {
    actor.tenant()?;
    let idea_id = path.into_inner();
    let content = body.content.as_deref().unwrap_or("");
    let entry = feedback::add_comment(&pool, idea_id, &actor, content, body.rating).await?;
    Ok(HttpResponse::Created().json(entry))
}

/// PUT /api/feedback/{id}
pub async fn update(
    pool: web::Data<PgPool>,
    actor: Actor,
    path: web::Path<i64>,
    body: web::Json<FeedbackPatch>,
) -> Result<HttpResponse, AppError> {
    let entry = feedback::update(&pool, path.into_inner(), &actor, &body).await?;
    Ok(HttpResponse::Ok().json(entry))
}

/// DELETE /api/feedback/{id}
pub async fn delete(
    pool: web::Data<PgPool>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    feedback::delete(&pool, id, &actor).await?;
    audit::record(&pool, Some(actor.user_id), "feedback.deleted", "feedback", id, json!({})).await;
    Ok(HttpResponse::Ok().json(json!({ "message": "Feedback deleted" })))
}
