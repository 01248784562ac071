use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::PgPool;

use crate::analysis::{self, AnalysisJobs, GeminiClient};
use crate::audit;
use crate::auth::session::Actor;
use crate::errors::AppError;
use crate::models::idea::{
    self, IdeaFilter, IdeaListQuery, IdeaPatch, IdeaPatchRequest, IdeaResponse, NewIdea,
    NewIdeaRequest, VoteRequest, forms,
};

/// GET /api/ideas - tenant-scoped, filtered, newest first
pub async fn list(
    pool: web::Data<PgPool>,
    actor: Actor,
    query: web::Query<IdeaListQuery>,
) -> Result<HttpResponse, AppError> {
    let tenant = actor.tenant()?;
    let filter = IdeaFilter::from_query(&query)?;
    let ideas = idea::list(&pool, tenant, &filter).await?;
    let body: Vec<IdeaResponse> = ideas.into_iter().map(IdeaResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/ideas
pub async fn create(
    pool: web::Data<PgPool>,
    jobs: web::Data<AnalysisJobs>,
    gemini: web::Data<GeminiClient>,
    actor: Actor,
    body: web::Json<NewIdeaRequest>,
) -> Result<HttpResponse, AppError> {
    let tenant = actor.tenant()?;
    let new_idea = NewIdea::from_request(&body)?;
    let created = idea::create(&pool, tenant, &actor, &new_idea).await?;

    audit::record(
        &pool,
        Some(actor.user_id),
        "idea.created",
        "idea",
        created.id,
        json!({ "title": created.title, "category": created.category }),
    )
    .await;

    if body.analyze {
        // Completion is observable through GET /api/ideas/{id}/analysis.
        let _ = jobs.spawn(pool.get_ref().clone(), gemini.get_ref().clone(), created.id, tenant);
    }

    Ok(HttpResponse::Created().json(IdeaResponse::from(created)))
}

/// GET /api/ideas/{id}
pub async fn read(
    pool: web::Data<PgPool>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let tenant = actor.tenant()?;
    let found = idea::find_by_id(&pool, path.into_inner(), tenant).await?;
    Ok(HttpResponse::Ok().json(IdeaResponse::from(found)))
}

/// PUT /api/ideas/{id}
pub async fn update(
    pool: web::Data<PgPool>,
    actor: Actor,
    path: web::Path<i64>,
    body: web::Json<IdeaPatchRequest>,
) -> Result<HttpResponse, AppError> {
    let tenant = actor.tenant()?;
    let id = path.into_inner();
    let patch = IdeaPatch::from_request(&body)?;

    let (updated, change) = idea::update(&pool, id, tenant, &actor, &patch).await?;

    audit::record(&pool, Some(actor.user_id), "idea.updated", "idea", id, json!({ "title": updated.title })).await;
    if let Some(change) = change {
        audit::record(
            &pool,
            Some(actor.user_id),
            "idea.status_changed",
            "idea",
            id,
            serde_json::to_value(&change).unwrap_or_default(),
        )
        .await;
    }

    Ok(HttpResponse::Ok().json(IdeaResponse::from(updated)))
}

/// DELETE /api/ideas/{id}
pub async fn delete(
    pool: web::Data<PgPool>,
    jobs: web::Data<AnalysisJobs>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let tenant = actor.tenant()?;
    let id = path.into_inner();
    idea::delete(&pool, id, tenant, &actor).await?;
    jobs.forget(id);
    audit::record(&pool, Some(actor.user_id), "idea.deleted", "idea", id, json!({})).await;
    Ok(HttpResponse::Ok().json(json!({ "message": "Idea deleted successfully" })))
}

/// POST /api/ideas/{id}/vote
pub async fn vote(
    pool: web::Data<PgPool>,
    actor: Actor,
    path: web::Path<i64>,
    body: web::Json<VoteRequest>,
) -> Result<HttpResponse, AppError> {
    let tenant = actor.tenant()?;
    let choice = forms::parse_vote(&body)?;
    let voted = idea::vote(&pool, path.into_inner(), tenant, &actor, choice).await?;
    Ok(HttpResponse::Ok().json(IdeaResponse::from(voted)))
}

/// POST /api/ideas/{id}/analyze - synchronous analysis
pub async fn analyze(
    pool: web::Data<PgPool>,
    gemini: web::Data<GeminiClient>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let tenant = actor.tenant()?;
    gemini.ensure_configured()?;
    let analysis = analysis::analyze_idea(&pool, gemini.get_ref(), path.into_inner(), tenant).await?;
    Ok(HttpResponse::Ok().json(json!({ "analysis": analysis })))
}

/// GET /api/ideas/{id}/analysis - state of the background run
pub async fn analysis_state(
    pool: web::Data<PgPool>,
    jobs: web::Data<AnalysisJobs>,
    actor: Actor,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let tenant = actor.tenant()?;
    let id = path.into_inner();
    idea::find_by_id(&pool, id, tenant).await?;
    Ok(HttpResponse::Ok().json(jobs.state(id)))
}
