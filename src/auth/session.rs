use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};

use crate::errors::AppError;
use crate::models::user::Role;

/// The authenticated caller, resolved from the bearer token by `middleware::require_bearer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub name: String,
    pub role: Role,
    pub startup_id: Option<i64>,
}

impl Actor {
    pub fn is_founder(&self) -> bool {
        self.role.is_founder()
    }

    /// The caller's tenant; ideas cannot be touched before onboarding completes.
    pub fn tenant(&self) -> Result<i64, AppError> {
        self.startup_id.ok_or_else(|| {
            AppError::Validation("User must be associated with a startup to work with ideas".to_string())
        })
    }
}

impl FromRequest for Actor {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Actor>()
                .cloned()
                .ok_or_else(|| AppError::Unauthenticated("User not authenticated".to_string())),
        )
    }
}
