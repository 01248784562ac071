use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

text_enum!(
    /// Role inside a startup. Founders sit on the board.
    Role, "Role" {
        Founder => "founder",
        Member => "member",
    }
);

impl Role {
    pub fn is_founder(&self) -> bool {
        matches!(self, Role::Founder)
    }
}

/// Internal user struct for authentication, including the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub startup_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Safe version for API responses, without the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub startup_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        UserProfile {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            startup_id: u.startup_id,
            created_at: u.created_at,
        }
    }
}

/// New user data for creation. `password_hash` is already hashed.
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}
