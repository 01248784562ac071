//! Idea lifecycle.
//!
//! ```text
//! pending ──> under-review ──> approved ──> implemented
//!    │             │
//!    └─────────────┴──────────> rejected
//! ```
//!
//! The arrows are the intended flow. Transitions are not restricted by the current state:
//! any state may be set again, including from a terminal one. What is restricted is who may
//! change it (founders only, see `auth::policy`).

use serde::Serialize;

use crate::auth::policy::{self, Action};
use crate::auth::session::Actor;
use crate::errors::AppError;
use super::types::{Idea, IdeaPatch, IdeaPriority, IdeaStatus};

impl IdeaStatus {
    /// Rejected and implemented ideas are finished from the team's point of view.
    pub fn is_terminal(&self) -> bool {
        matches!(self, IdeaStatus::Rejected | IdeaStatus::Implemented)
    }

    /// Whether `next` follows the intended flow from this state.
    pub fn is_forward_step(&self, next: IdeaStatus) -> bool {
        use IdeaStatus::*;
        matches!(
            (self, next),
            (Pending, UnderReview | Approved | Rejected)
                | (UnderReview, Approved | Rejected)
                | (Approved, Implemented)
        )
    }
}

/// Workflow fields changed by a patch, for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowChange {
    pub status_from: IdeaStatus,
    pub status_to: IdeaStatus,
    pub priority_from: IdeaPriority,
    pub priority_to: IdeaPriority,
    pub forward: bool,
    /// A finished idea (rejected or implemented) was moved back into an open state.
    pub reopened: bool,
}

/// Authorize a patch against the current idea and describe its workflow effect.
///
/// Runs before anything is written: a member sending `status` or `priority` is rejected
/// and none of the other fields are applied either.
pub fn check_patch(actor: &Actor, idea: &Idea, patch: &IdeaPatch) -> Result<Option<WorkflowChange>, AppError> {
    if !patch.touches_workflow() {
        return Ok(None);
    }
    policy::authorize(actor, Action::ChangeIdeaWorkflow { startup_id: idea.startup_id })?;

    let status_to = patch.status.unwrap_or(idea.status);
    let priority_to = patch.priority.unwrap_or(idea.priority);
    if status_to == idea.status && priority_to == idea.priority {
        return Ok(None);
    }

    Ok(Some(WorkflowChange {
        status_from: idea.status,
        status_to,
        priority_from: idea.priority,
        priority_to,
        forward: idea.status.is_forward_step(status_to),
        reopened: idea.status.is_terminal() && !status_to.is_terminal(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::idea::ledger::VotingStats;
    use crate::models::idea::types::{IdeaCategory, Submitter};
    use crate::models::user::Role;

    fn idea(status: IdeaStatus) -> Idea {
        Idea {
            id: 1,
            startup_id: 7,
            title: "Dark mode".into(),
            description: "Add dark theme".into(),
            category: IdeaCategory::Feature,
            status,
            priority: IdeaPriority::Medium,
            tags: vec![],
            submitted_by: Submitter { id: 2, name: "M".into(), email: "m@x.io".into(), role: Role::Member },
            voting_stats: VotingStats::default(),
            ai_analysis: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn actor(role: Role) -> Actor {
        Actor { user_id: 1, name: "A".into(), role, startup_id: Some(7) }
    }

    #[test]
    fn member_cannot_patch_status_even_with_other_fields() {
        let patch = IdeaPatch {
            title: Some("Renamed".into()),
            status: Some(IdeaStatus::Approved),
            ..IdeaPatch::default()
        };
        let result = check_patch(&actor(Role::Member), &idea(IdeaStatus::Pending), &patch);
        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[test]
    fn member_may_patch_plain_fields() {
        let patch = IdeaPatch { title: Some("Renamed".into()), ..IdeaPatch::default() };
        assert_eq!(check_patch(&actor(Role::Member), &idea(IdeaStatus::Pending), &patch).ok(), Some(None));
    }

    #[test]
    fn founder_may_reenter_any_state() {
        let patch = IdeaPatch { status: Some(IdeaStatus::Pending), ..IdeaPatch::default() };
        let change = check_patch(&actor(Role::Founder), &idea(IdeaStatus::Implemented), &patch)
            .expect("allowed")
            .expect("changed");
        assert_eq!(change.status_from, IdeaStatus::Implemented);
        assert_eq!(change.status_to, IdeaStatus::Pending);
        assert!(!change.forward);
        assert!(change.reopened);
    }

    #[test]
    fn unchanged_workflow_is_not_a_change() {
        let patch = IdeaPatch { status: Some(IdeaStatus::Pending), ..IdeaPatch::default() };
        assert_eq!(check_patch(&actor(Role::Founder), &idea(IdeaStatus::Pending), &patch).ok(), Some(None));
    }

    #[test]
    fn forward_steps_and_terminal_states() {
        assert!(IdeaStatus::Pending.is_forward_step(IdeaStatus::UnderReview));
        assert!(IdeaStatus::UnderReview.is_forward_step(IdeaStatus::Rejected));
        assert!(IdeaStatus::Approved.is_forward_step(IdeaStatus::Implemented));
        assert!(!IdeaStatus::Rejected.is_forward_step(IdeaStatus::Approved));
        assert!(IdeaStatus::Rejected.is_terminal());
        assert!(IdeaStatus::Implemented.is_terminal());
        assert!(!IdeaStatus::UnderReview.is_terminal());
    }
}
