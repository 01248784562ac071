use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::Role;
use super::ledger::VotingStats;

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

text_enum!(
    IdeaCategory, "Category" {
        Feature => "feature",
        Product => "product",
        Process => "process",
        Strategy => "strategy",
        Other => "other",
    }
);

text_enum!(
    IdeaStatus, "Status" {
        Pending => "pending",
        UnderReview => "under-review",
        Approved => "approved",
        Rejected => "rejected",
        Implemented => "implemented",
    }
);

text_enum!(
    IdeaPriority, "Priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
);

text_enum!(
    VoteChoice, "Vote" {
        Upvote => "upvote",
        Downvote => "downvote",
    }
);

text_enum!(
    Recommendation, "Recommendation" {
        Approve => "approve",
        NeedsWork => "needs-work",
        Reject => "reject",
    }
);

/// Submitter as embedded in idea responses.
#[derive(Debug, Clone, Serialize)]
pub struct Submitter {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Structured verdict from the text-generation service, after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub feasibility: u8,
    pub market_potential: u8,
    pub technical_complexity: u8,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub risks: Vec<String>,
    pub recommendation: Recommendation,
    pub suggestions: Vec<String>,
    pub full_analysis: String,
    pub analyzed_at: DateTime<Utc>,
}

impl AiAnalysis {
    /// Composite score; complexity counts against the idea.
    pub fn score(&self) -> i64 {
        let sum = i64::from(self.feasibility) + i64::from(self.market_potential)
            + (10 - i64::from(self.technical_complexity));
        (sum as f64 / 3.0).round() as i64
    }
}

#[derive(Debug, Clone)]
pub struct Idea {
    pub id: i64,
    pub startup_id: i64,
    pub title: String,
    pub description: String,
    pub category: IdeaCategory,
    pub status: IdeaStatus,
    pub priority: IdeaPriority,
    pub tags: Vec<String>,
    pub submitted_by: Submitter,
    pub voting_stats: VotingStats,
    pub ai_analysis: Option<AiAnalysis>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    pub fn ai_score(&self) -> Option<i64> {
        self.ai_analysis.as_ref().map(AiAnalysis::score)
    }

    pub fn total_votes(&self) -> i64 {
        self.voting_stats.upvotes - self.voting_stats.downvotes
    }
}

/// Idea as returned by the API, with the derived fields filled in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: IdeaCategory,
    pub status: IdeaStatus,
    pub priority: IdeaPriority,
    pub tags: Vec<String>,
    pub submitted_by: Submitter,
    pub startup: i64,
    pub voting_stats: VotingStats,
    pub ai_analysis: Option<AiAnalysis>,
    pub ai_score: Option<i64>,
    pub total_votes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Idea> for IdeaResponse {
    fn from(idea: Idea) -> Self {
        let ai_score = idea.ai_score();
        let total_votes = idea.total_votes();
        IdeaResponse {
            id: idea.id,
            title: idea.title,
            description: idea.description,
            category: idea.category,
            status: idea.status,
            priority: idea.priority,
            tags: idea.tags,
            submitted_by: idea.submitted_by,
            startup: idea.startup_id,
            voting_stats: idea.voting_stats,
            ai_analysis: idea.ai_analysis,
            ai_score,
            total_votes,
            created_at: idea.created_at,
            updated_at: idea.updated_at,
        }
    }
}

/// Validated input for `create`.
#[derive(Debug, Clone)]
pub struct NewIdea {
    pub title: String,
    pub description: String,
    pub category: IdeaCategory,
    pub tags: Vec<String>,
    pub priority: IdeaPriority,
}

/// Validated partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct IdeaPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<IdeaCategory>,
    pub tags: Option<Vec<String>>,
    pub status: Option<IdeaStatus>,
    pub priority: Option<IdeaPriority>,
}

impl IdeaPatch {
    /// Status and priority are founder-only fields.
    pub fn touches_workflow(&self) -> bool {
        self.status.is_some() || self.priority.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct IdeaFilter {
    pub category: Option<IdeaCategory>,
    pub status: Option<IdeaStatus>,
    pub priority: Option<IdeaPriority>,
    pub search: Option<String>,
}

/// Body of `POST /api/ideas`. Fields are strings so that every problem is reported at once.
#[derive(Debug, Deserialize)]
pub struct NewIdeaRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub priority: Option<String>,
    #[serde(default)]
    pub analyze: bool,
}

/// Body of `PUT /api/ideas/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct IdeaPatchRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// Query string of `GET /api/ideas`. Empty values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct IdeaListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote: Option<String>,
}
