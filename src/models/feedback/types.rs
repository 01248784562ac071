use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

text_enum!(
    FeedbackType, "Feedback type" {
        Comment => "comment",
        Vote => "vote",
        Approval => "approval",
        AiAnalysis => "ai-analysis",
    }
);

text_enum!(
    FeedbackVote, "Vote" {
        Upvote => "upvote",
        Downvote => "downvote",
        Neutral => "neutral",
    }
);

/// Display name recorded on AI-authored entries.
pub const AI_AUTHOR_NAME: &str = "AI Assistant";

/// One entry of an idea's feedback thread.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub id: i64,
    pub idea_id: i64,
    pub submitted_by: Option<i64>,
    pub submitted_by_name: String,
    #[serde(rename = "isAI")]
    pub is_ai: bool,
    pub feedback_type: FeedbackType,
    pub content: Option<String>,
    pub vote: Option<FeedbackVote>,
    pub rating: Option<i16>,
    pub is_board_member: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: Option<String>,
    pub rating: Option<i16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackPatch {
    pub content: Option<String>,
    pub rating: Option<i16>,
}
