use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Migrate(sqlx::migrate::MigrateError),
    Hash(String),
    /// Missing or invalid request fields; the message names the fields.
    Validation(String),
    Unauthenticated(String),
    /// Role check failed (e.g. a member changing status).
    PermissionDenied(String),
    /// Tenant or ownership check failed.
    AccessDenied,
    NotFound(&'static str),
    Configuration(String),
    RateLimited,
    Upstream(String),
    /// The text-generation service answered with something that holds no JSON object.
    UpstreamParse { raw: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Migrate(e) => write!(f, "Migration error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Validation(msg) => write!(f, "{msg}"),
            AppError::Unauthenticated(msg) => write!(f, "{msg}"),
            AppError::PermissionDenied(msg) => write!(f, "{msg}"),
            AppError::AccessDenied => write!(f, "Access denied"),
            AppError::NotFound(what) => write!(f, "{what} not found"),
            AppError::Configuration(msg) => write!(f, "{msg}"),
            AppError::RateLimited => write!(f, "Too many failed attempts, try again later"),
            AppError::Upstream(msg) => write!(f, "AI analysis failed: {msg}"),
            AppError::UpstreamParse { .. } => write!(f, "Failed to parse AI response"),
        }
    }
}

impl AppError {
    /// Message shown to API clients. Internal failures are not described.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Db(_) | AppError::Migrate(_) | AppError::Hash(_) => "Server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Configuration(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied(_) | AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Db(_)
            | AppError::Migrate(_)
            | AppError::Hash(_)
            | AppError::Upstream(_)
            | AppError::UpstreamParse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        }
        HttpResponse::build(status).json(serde_json::json!({ "message": self.public_message() }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::Migrate(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Configuration("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthenticated("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::PermissionDenied("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::AccessDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Idea").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::UpstreamParse { raw: "nope".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Db(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_are_masked() {
        assert_eq!(AppError::Db(sqlx::Error::RowNotFound).public_message(), "Server error");
        assert_eq!(AppError::NotFound("Idea").public_message(), "Idea not found");
        assert_eq!(AppError::AccessDenied.public_message(), "Access denied");
    }
}
