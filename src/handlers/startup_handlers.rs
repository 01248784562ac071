use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::PgPool;

use crate::audit;
use crate::auth::session::Actor;
use crate::auth::validate;
use crate::errors::AppError;
use crate::models::startup::{self, JoinStartupRequest, NewStartupRequest};

fn ensure_unassigned(actor: &Actor) -> Result<(), AppError> {
    match actor.startup_id {
        Some(_) => Err(AppError::Validation("User already belongs to a startup".to_string())),
        None => Ok(()),
    }
}

/// POST /api/startups - the caller becomes the founder
pub async fn create(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<NewStartupRequest>,
) -> Result<HttpResponse, AppError> {
    ensure_unassigned(&actor)?;
    if let Some(error) = validate::validate_required(&body.name, "Name", 100) {
        return Err(AppError::Validation(error));
    }

    let startup = startup::found(&pool, actor.user_id, &body).await?;
    audit::record(
        &pool,
        Some(actor.user_id),
        "startup.created",
        "startup",
        startup.id,
        json!({ "name": startup.name }),
    )
    .await;
    Ok(HttpResponse::Created().json(startup))
}

/// POST /api/startups/join
pub async fn join(
    pool: web::Data<PgPool>,
    actor: Actor,
    body: web::Json<JoinStartupRequest>,
) -> Result<HttpResponse, AppError> {
    ensure_unassigned(&actor)?;
    if body.join_code.trim().is_empty() {
        return Err(AppError::Validation("Join code is required".to_string()));
    }

    let startup = startup::join(&pool, actor.user_id, &body.join_code).await?;
    audit::record(&pool, Some(actor.user_id), "startup.joined", "startup", startup.id, json!({})).await;
    Ok(HttpResponse::Ok().json(startup))
}

/// GET /api/startups/current
pub async fn current(pool: web::Data<PgPool>, actor: Actor) -> Result<HttpResponse, AppError> {
    let tenant = actor.tenant()?;
    let startup = startup::find_by_id(&pool, tenant)
        .await?
        .ok_or(AppError::NotFound("Startup"))?;
    Ok(HttpResponse::Ok().json(startup))
}
