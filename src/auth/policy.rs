//! Single authorization point for idea and feedback operations.
//!
//! Handlers and models describe what they are about to do as an [`Action`] and ask
//! [`authorize`]. Tenant isolation is checked first for every action, so a founder of one
//! startup gains nothing in another.

use crate::auth::session::Actor;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy)]
pub enum Action {
    /// Read or interact with anything owned by `startup_id`.
    AccessTenant { startup_id: i64 },
    /// Set an idea's status or priority.
    ChangeIdeaWorkflow { startup_id: i64 },
    DeleteIdea { startup_id: i64, submitted_by: i64 },
    EditFeedback { startup_id: i64, submitted_by: Option<i64>, is_ai: bool },
    DeleteFeedback { startup_id: i64, submitted_by: Option<i64>, is_ai: bool },
}

impl Action {
    fn startup_id(&self) -> i64 {
        match *self {
            Action::AccessTenant { startup_id }
            | Action::ChangeIdeaWorkflow { startup_id }
            | Action::DeleteIdea { startup_id, .. }
            | Action::EditFeedback { startup_id, .. }
            | Action::DeleteFeedback { startup_id, .. } => startup_id,
        }
    }
}

/// Tenant isolation for model functions that receive the caller's tenant directly.
pub fn ensure_tenant(resource_startup_id: i64, tenant: i64) -> Result<(), AppError> {
    if resource_startup_id == tenant {
        Ok(())
    } else {
        Err(AppError::AccessDenied)
    }
}

pub fn authorize(actor: &Actor, action: Action) -> Result<(), AppError> {
    match actor.startup_id {
        Some(tenant) => ensure_tenant(action.startup_id(), tenant)?,
        None => return Err(AppError::AccessDenied),
    }

    match action {
        Action::AccessTenant { .. } => Ok(()),
        Action::ChangeIdeaWorkflow { .. } => {
            if actor.is_founder() {
                Ok(())
            } else {
                Err(AppError::PermissionDenied(
                    "Only founders can change status or priority".to_string(),
                ))
            }
        }
        Action::DeleteIdea { submitted_by, .. } => {
            if actor.is_founder() || actor.user_id == submitted_by {
                Ok(())
            } else {
                Err(AppError::PermissionDenied(
                    "Only founders or the original submitter can delete an idea".to_string(),
                ))
            }
        }
        Action::EditFeedback { submitted_by, is_ai, .. } => {
            if is_ai || submitted_by != Some(actor.user_id) {
                Err(AppError::AccessDenied)
            } else {
                Ok(())
            }
        }
        Action::DeleteFeedback { submitted_by, is_ai, .. } => {
            if is_ai || (submitted_by != Some(actor.user_id) && !actor.is_founder()) {
                Err(AppError::AccessDenied)
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    const TENANT: i64 = 10;

    fn actor(user_id: i64, role: Role) -> Actor {
        Actor { user_id, name: format!("user{user_id}"), role, startup_id: Some(TENANT) }
    }

    fn is_access_denied(result: Result<(), AppError>) -> bool {
        matches!(result, Err(AppError::AccessDenied))
    }

    fn is_permission_denied(result: Result<(), AppError>) -> bool {
        matches!(result, Err(AppError::PermissionDenied(_)))
    }

    #[test]
    fn other_tenant_is_always_denied() {
        let founder = actor(1, Role::Founder);
        assert!(is_access_denied(authorize(&founder, Action::AccessTenant { startup_id: 99 })));
        assert!(is_access_denied(authorize(&founder, Action::ChangeIdeaWorkflow { startup_id: 99 })));
        assert!(is_access_denied(authorize(
            &founder,
            Action::DeleteFeedback { startup_id: 99, submitted_by: Some(1), is_ai: false }
        )));
    }

    #[test]
    fn user_without_startup_is_denied() {
        let drifter = Actor { startup_id: None, ..actor(3, Role::Member) };
        assert!(is_access_denied(authorize(&drifter, Action::AccessTenant { startup_id: TENANT })));
    }

    #[test]
    fn only_founders_change_workflow() {
        assert!(authorize(&actor(1, Role::Founder), Action::ChangeIdeaWorkflow { startup_id: TENANT }).is_ok());
        assert!(is_permission_denied(authorize(
            &actor(2, Role::Member),
            Action::ChangeIdeaWorkflow { startup_id: TENANT }
        )));
    }

    #[test]
    fn idea_deletion_by_founder_or_submitter() {
        let delete = Action::DeleteIdea { startup_id: TENANT, submitted_by: 2 };
        assert!(authorize(&actor(1, Role::Founder), delete).is_ok());
        assert!(authorize(&actor(2, Role::Member), delete).is_ok());
        assert!(is_permission_denied(authorize(&actor(3, Role::Member), delete)));
    }

    #[test]
    fn ai_feedback_is_immutable_for_everyone() {
        for who in [actor(1, Role::Founder), actor(2, Role::Member)] {
            let edit = Action::EditFeedback { startup_id: TENANT, submitted_by: None, is_ai: true };
            let delete = Action::DeleteFeedback { startup_id: TENANT, submitted_by: None, is_ai: true };
            assert!(is_access_denied(authorize(&who, edit)));
            assert!(is_access_denied(authorize(&who, delete)));
        }
    }

    #[test]
    fn feedback_edit_is_owner_only_but_founders_may_delete() {
        let edit = Action::EditFeedback { startup_id: TENANT, submitted_by: Some(2), is_ai: false };
        let delete = Action::DeleteFeedback { startup_id: TENANT, submitted_by: Some(2), is_ai: false };

        assert!(authorize(&actor(2, Role::Member), edit).is_ok());
        assert!(is_access_denied(authorize(&actor(1, Role::Founder), edit)));
        assert!(is_access_denied(authorize(&actor(3, Role::Member), edit)));

        assert!(authorize(&actor(2, Role::Member), delete).is_ok());
        assert!(authorize(&actor(1, Role::Founder), delete).is_ok());
        assert!(is_access_denied(authorize(&actor(3, Role::Member), delete)));
    }
}
