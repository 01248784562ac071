use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use sqlx::PgPool;

use crate::audit;
use crate::auth::middleware::bearer_token;
use crate::auth::session::Actor;
use crate::auth::{password, rate_limit::RateLimiter, token, validate};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::user::{self, LoginRequest, NewUser, SignupRequest, UserProfile};

/// POST /api/auth/signup
pub async fn signup(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_name(&body.name));
    errors.extend(validate::validate_email(&body.email));
    errors.extend(validate::validate_password(&body.password));
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    if user::email_exists(&pool, &body.email).await? {
        return Err(AppError::Validation("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&body.password)?;
    let user_id = user::create(
        &pool,
        &NewUser { name: body.name.clone(), email: body.email.clone(), password_hash },
    )
    .await?;
    let profile = user::find_by_id(&pool, user_id)
        .await?
        .map(UserProfile::from)
        .ok_or(AppError::NotFound("User"))?;
    let token = token::issue(&pool, user_id, config.token_ttl).await?;

    audit::record(&pool, Some(user_id), "user.signup", "user", user_id, json!({ "email": profile.email })).await;
    log::info!("User #{user_id} signed up");

    Ok(HttpResponse::Created().json(json!({ "token": token, "user": profile })))
}

/// POST /api/auth/login
pub async fn login(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    limiter: web::Data<RateLimiter>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    // Rate-limit check BEFORE any database access
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("{ip}|{}", body.email.trim().to_lowercase());
    if limiter.is_blocked(&key) {
        log::warn!("Login blocked for {key}");
        return Err(AppError::RateLimited);
    }

    let found = user::find_by_email(&pool, &body.email).await?;
    let verified = match &found {
        Some(u) => password::verify_password(&body.password, &u.password_hash)?,
        None => false,
    };

    match found {
        Some(u) if verified => {
            limiter.clear(&key);
            let token = token::issue(&pool, u.id, config.token_ttl).await?;
            log::info!("User #{} logged in", u.id);
            Ok(HttpResponse::Ok().json(json!({ "token": token, "user": UserProfile::from(u) })))
        }
        _ => {
            limiter.record_failure(&key);
            Err(AppError::Unauthenticated("Invalid credentials".to_string()))
        }
    }
}

/// GET /api/auth/me
pub async fn me(pool: web::Data<PgPool>, actor: Actor) -> Result<HttpResponse, AppError> {
    let profile = user::find_by_id(&pool, actor.user_id)
        .await?
        .map(UserProfile::from)
        .ok_or(AppError::NotFound("User"))?;
    Ok(HttpResponse::Ok().json(profile))
}

/// POST /api/auth/logout
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    actor: Actor,
) -> Result<HttpResponse, AppError> {
    if let Some(token) = bearer_token(req.headers()) {
        token::revoke(&pool, &token).await?;
    }
    log::info!("User #{} logged out", actor.user_id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Logged out" })))
}
