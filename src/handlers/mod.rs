pub mod auth_handlers;
pub mod feedback_handlers;
pub mod idea_handlers;
pub mod startup_handlers;

use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, header},
    middleware::{Next, from_fn},
    web,
};

use crate::auth::middleware::require_bearer;
use crate::errors::AppError;

/// CSRF guard for mutation endpoints.
///
/// Rejects POST/PUT/DELETE requests that carry a body without
/// `Content-Type: application/json`. Bodiless mutations (logout, analyze, delete) pass.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();
    let has_body = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .is_some_and(|len| len > 0)
        || req.headers().contains_key(header::TRANSFER_ENCODING);

    if has_body && (method == Method::POST || method == Method::PUT || method == Method::DELETE) {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = serde_json::json!({
                "message": "Content-Type must be application/json for mutation requests"
            });
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Malformed JSON bodies become validation errors with the usual `{message}` shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::Validation(format!("Invalid request body: {err}")).into())
}

/// Configure all `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    cfg.service(
        web::scope("/api")
            .wrap(from_fn(require_json_content_type))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth_handlers::signup))
                    .route("/login", web::post().to(auth_handlers::login))
                    .service(
                        web::resource("/me")
                            .wrap(from_fn(require_bearer))
                            .route(web::get().to(auth_handlers::me)),
                    )
                    .service(
                        web::resource("/logout")
                            .wrap(from_fn(require_bearer))
                            .route(web::post().to(auth_handlers::logout)),
                    ),
            )
            .service(
                web::scope("/startups")
                    .wrap(from_fn(require_bearer))
                    .route("", web::post().to(startup_handlers::create))
                    .route("/join", web::post().to(startup_handlers::join))
                    .route("/current", web::get().to(startup_handlers::current)),
            )
            .service(
                web::scope("/ideas")
                    .wrap(from_fn(require_bearer))
                    .route("", web::get().to(idea_handlers::list))
                    .route("", web::post().to(idea_handlers::create))
                    .route("/{id}", web::get().to(idea_handlers::read))
                    .route("/{id}", web::put().to(idea_handlers::update))
                    .route("/{id}", web::delete().to(idea_handlers::delete))
                    .route("/{id}/vote", web::post().to(idea_handlers::vote))
                    .route("/{id}/analyze", web::post().to(idea_handlers::analyze))
                    .route("/{id}/analysis", web::get().to(idea_handlers::analysis_state))
                    .route("/{id}/feedback", web::get().to(feedback_handlers::list))
                    .route("/{id}/feedback", web::post().to(feedback_handlers::create)),
            )
            .service(
                web::scope("/feedback")
                    .wrap(from_fn(require_bearer))
                    .route("/{id}", web::put().to(feedback_handlers::update))
                    .route("/{id}", web::delete().to(feedback_handlers::delete)),
            ),
    );
}
