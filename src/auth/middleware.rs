use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{self, HeaderMap},
    middleware::Next,
    web,
};
use sqlx::PgPool;

use crate::auth::token;

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({ "message": message }))
}

/// Middleware function that resolves the bearer token into an `Actor`.
/// Answers 401 with a JSON body when the token is missing, unknown or expired.
pub async fn require_bearer(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let Some(token) = bearer_token(req.headers()) else {
        let response = unauthorized("No token, authorization denied");
        return Ok(req.into_response(response).map_into_right_body());
    };

    let Some(pool) = req.app_data::<web::Data<PgPool>>().cloned() else {
        log::error!("require_bearer: no database pool registered");
        let response = HttpResponse::InternalServerError().json(serde_json::json!({ "message": "Server error" }));
        return Ok(req.into_response(response).map_into_right_body());
    };

    match token::resolve(&pool, &token).await {
        Ok(Some(actor)) => {
            req.extensions_mut().insert(actor);
            next.call(req).await.map(|res| res.map_into_left_body())
        }
        Ok(None) => {
            let response = unauthorized("Token is not valid");
            Ok(req.into_response(response).map_into_right_body())
        }
        Err(e) => {
            log::error!("Token lookup failed: {e}");
            let response = HttpResponse::InternalServerError().json(serde_json::json!({ "message": "Server error" }));
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
