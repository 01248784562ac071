//! Shared test infrastructure for database-backed tests.
//!
//! Tests run against the Postgres database named by `DATABASE_URL`, with migrations
//! applied. When it is unset, database tests return early so `cargo test` still runs the
//! pure unit tests on machines without Postgres.
#![allow(dead_code)]

use std::future::Future;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use ideahub::analysis::TextGenerator;
use ideahub::auth::password;
use ideahub::auth::session::Actor;
use ideahub::db::MIGRATOR;
use ideahub::errors::AppError;
use ideahub::models::idea::{self, Idea, IdeaCategory, IdeaPriority, NewIdea};
use ideahub::models::startup::{self, NewStartupRequest, Startup};
use ideahub::models::user::{self, NewUser};

pub const TEST_PASSWORD: &str = "Password1!";

// ============================================================================
// DATABASE SETUP
// ============================================================================

/// Pool on the test database, or `None` when `DATABASE_URL` is not configured.
pub async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty())?;
    let pool = PgPoolOptions::new()
        .max_connections(12)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    MIGRATOR.run(&pool).await.expect("run migrations");
    Some(pool)
}

/// Unique suffix so tests sharing one database never collide.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}_{:016x}", rand::random::<u64>())
}

// ============================================================================
// FIXTURES
// ============================================================================

pub async fn create_user(pool: &PgPool, name: &str) -> i64 {
    let hash = password::hash_password(TEST_PASSWORD).expect("hash");
    user::create(
        pool,
        &NewUser { name: name.to_string(), email: format!("{}@test.com", unique(name)), password_hash: hash },
    )
    .await
    .expect("create user")
}

/// The request-time view of a user, as the bearer middleware would build it.
pub async fn actor_for(pool: &PgPool, user_id: i64) -> Actor {
    let u = user::find_by_id(pool, user_id).await.expect("query").expect("user exists");
    Actor { user_id: u.id, name: u.name, role: u.role, startup_id: u.startup_id }
}

/// A startup with one founder and `members` plain members.
pub struct Team {
    pub startup: Startup,
    pub founder: Actor,
    pub members: Vec<Actor>,
}

impl Team {
    pub fn tenant(&self) -> i64 {
        self.startup.id
    }
}

pub async fn create_team(pool: &PgPool, members: usize) -> Team {
    let founder_id = create_user(pool, "founder").await;
    let request = NewStartupRequest {
        name: unique("Acme"),
        domain: Some("Fintech".to_string()),
        stage: Some("Seed".to_string()),
    };
    let startup = startup::found(pool, founder_id, &request).await.expect("found startup");

    let mut member_actors = Vec::with_capacity(members);
    for i in 0..members {
        let id = create_user(pool, &format!("member{i}")).await;
        startup::join(pool, id, &startup.join_code).await.expect("join startup");
        member_actors.push(actor_for(pool, id).await);
    }

    Team { founder: actor_for(pool, founder_id).await, startup, members: member_actors }
}

pub async fn create_idea(pool: &PgPool, team: &Team, submitter: &Actor, title: &str) -> Idea {
    let new_idea = NewIdea {
        title: title.to_string(),
        description: format!("{title} for all users"),
        category: IdeaCategory::Feature,
        tags: vec!["ui".to_string()],
        priority: IdeaPriority::Medium,
    };
    idea::create(pool, team.tenant(), submitter, &new_idea).await.expect("create idea")
}

// ============================================================================
// TEXT GENERATORS
// ============================================================================

/// Answers every prompt with the same text.
#[derive(Clone)]
pub struct StaticGenerator(pub String);

impl TextGenerator for StaticGenerator {
    fn generate(&self, _prompt: &str) -> impl Future<Output = Result<String, AppError>> + Send {
        let text = self.0.clone();
        async move { Ok(text) }
    }
}

/// Always fails as an unreachable upstream would.
#[derive(Clone)]
pub struct FailingGenerator;

impl TextGenerator for FailingGenerator {
    fn generate(&self, _prompt: &str) -> impl Future<Output = Result<String, AppError>> + Send {
        async { Err(AppError::Upstream("connection refused".to_string())) }
    }
}

pub const APPROVE_RESPONSE: &str = r#"Sure! Here is my analysis:
```json
{
  "feasibility": 8,
  "marketPotential": 7,
  "technicalComplexity": 3,
  "pros": ["Reduces eye strain", "Frequently requested"],
  "cons": ["Extra theming work"],
  "risks": ["Inconsistent contrast"],
  "recommendation": "approve",
  "suggestions": ["Ship behind a flag", "Survey users"],
  "summary": "A cheap, popular improvement."
}
```"#;
