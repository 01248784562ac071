//! Turn raw request bodies into validated idea inputs, reporting every problem at once.

use crate::auth::validate::{normalize_tags, validate_required};
use crate::errors::AppError;
use super::types::*;

fn parse_field<T>(raw: Option<&str>, errors: &mut Vec<String>) -> Option<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

fn into_result<T>(value: T, errors: Vec<String>) -> Result<T, AppError> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(AppError::Validation(errors.join("; ")))
    }
}

impl NewIdea {
    pub fn from_request(req: &NewIdeaRequest) -> Result<Self, AppError> {
        let mut errors = Vec::new();

        let title = req.title.as_deref().unwrap_or("");
        errors.extend(validate_required(title, "Title", TITLE_MAX_CHARS));
        let description = req.description.as_deref().unwrap_or("");
        errors.extend(validate_required(description, "Description", DESCRIPTION_MAX_CHARS));

        let category = match req.category.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("Category is required".to_string());
                None
            }
            Some(raw) => parse_field::<IdeaCategory>(Some(raw), &mut errors),
        };
        let priority = parse_field::<IdeaPriority>(
            req.priority.as_deref().filter(|p| !p.trim().is_empty()),
            &mut errors,
        );

        if !errors.is_empty() {
            return Err(AppError::Validation(errors.join("; ")));
        }

        Ok(NewIdea {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            category: category.unwrap_or(IdeaCategory::Other),
            tags: req.tags.as_deref().map(normalize_tags).unwrap_or_default(),
            priority: priority.unwrap_or(IdeaPriority::Medium),
        })
    }
}

impl IdeaPatch {
    /// Provided fields must be valid; absent fields stay untouched.
    pub fn from_request(req: &IdeaPatchRequest) -> Result<Self, AppError> {
        let mut errors = Vec::new();

        let title = req.title.as_deref().map(|t| {
            errors.extend(validate_required(t, "Title", TITLE_MAX_CHARS));
            t.trim().to_string()
        });
        let description = req.description.as_deref().map(|d| {
            errors.extend(validate_required(d, "Description", DESCRIPTION_MAX_CHARS));
            d.trim().to_string()
        });

        let patch = IdeaPatch {
            title,
            description,
            category: parse_field(req.category.as_deref(), &mut errors),
            tags: req.tags.as_deref().map(normalize_tags),
            status: parse_field(req.status.as_deref(), &mut errors),
            priority: parse_field(req.priority.as_deref(), &mut errors),
        };
        into_result(patch, errors)
    }
}

impl IdeaFilter {
    pub fn from_query(query: &IdeaListQuery) -> Result<Self, AppError> {
        fn present(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        let mut errors = Vec::new();
        let filter = IdeaFilter {
            category: parse_field(present(&query.category), &mut errors),
            status: parse_field(present(&query.status), &mut errors),
            priority: parse_field(present(&query.priority), &mut errors),
            search: present(&query.search).map(str::to_string),
        };
        into_result(filter, errors)
    }
}

pub fn parse_vote(req: &VoteRequest) -> Result<VoteChoice, AppError> {
    match req.vote.as_deref() {
        None => Err(AppError::Validation("Vote is required".to_string())),
        Some(raw) => raw.parse().map_err(AppError::Validation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: Option<&str>, description: Option<&str>, category: Option<&str>) -> NewIdeaRequest {
        NewIdeaRequest {
            title: title.map(String::from),
            description: description.map(String::from),
            category: category.map(String::from),
            tags: None,
            priority: None,
            analyze: false,
        }
    }

    fn validation_message(result: Result<impl std::fmt::Debug, AppError>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn new_idea_defaults() {
        let idea = NewIdea::from_request(&request(Some(" Dark mode "), Some("Add dark theme"), Some("feature")))
            .expect("valid");
        assert_eq!(idea.title, "Dark mode");
        assert_eq!(idea.category, IdeaCategory::Feature);
        assert_eq!(idea.priority, IdeaPriority::Medium);
        assert!(idea.tags.is_empty());
    }

    #[test]
    fn new_idea_names_every_missing_field() {
        let msg = validation_message(NewIdea::from_request(&request(None, Some(""), None)));
        assert!(msg.contains("Title is required"));
        assert!(msg.contains("Description is required"));
        assert!(msg.contains("Category is required"));
    }

    #[test]
    fn new_idea_rejects_unknown_category_and_priority() {
        let mut req = request(Some("t"), Some("d"), Some("gizmo"));
        req.priority = Some("urgent".to_string());
        let msg = validation_message(NewIdea::from_request(&req));
        assert!(msg.contains("Category must be one of"));
        assert!(msg.contains("Priority must be one of"));
    }

    #[test]
    fn patch_rejects_blank_title_and_bad_status() {
        let req = IdeaPatchRequest {
            title: Some("  ".to_string()),
            status: Some("done".to_string()),
            ..IdeaPatchRequest::default()
        };
        let msg = validation_message(IdeaPatch::from_request(&req));
        assert!(msg.contains("Title is required"));
        assert!(msg.contains("Status must be one of"));
    }

    #[test]
    fn patch_parses_workflow_fields() {
        let req = IdeaPatchRequest {
            status: Some("under-review".to_string()),
            priority: Some("high".to_string()),
            tags: Some(vec!["a".to_string(), "a".to_string()]),
            ..IdeaPatchRequest::default()
        };
        let patch = IdeaPatch::from_request(&req).expect("valid");
        assert_eq!(patch.status, Some(IdeaStatus::UnderReview));
        assert_eq!(patch.priority, Some(IdeaPriority::High));
        assert_eq!(patch.tags, Some(vec!["a".to_string()]));
        assert!(patch.title.is_none());
    }

    #[test]
    fn empty_filter_values_are_ignored() {
        let query = IdeaListQuery {
            category: Some(String::new()),
            status: Some("approved".to_string()),
            priority: None,
            search: Some("  ".to_string()),
        };
        let filter = IdeaFilter::from_query(&query).expect("valid");
        assert!(filter.category.is_none());
        assert_eq!(filter.status, Some(IdeaStatus::Approved));
        assert!(filter.search.is_none());
    }

    #[test]
    fn vote_must_be_up_or_down() {
        assert_eq!(parse_vote(&VoteRequest { vote: Some("upvote".into()) }).ok(), Some(VoteChoice::Upvote));
        assert!(parse_vote(&VoteRequest { vote: Some("neutral".into()) }).is_err());
        assert!(parse_vote(&VoteRequest { vote: None }).is_err());
    }
}
