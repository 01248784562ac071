//! Feedback thread: comments, ownership rules and immutable AI entries.

use ideahub::errors::AppError;
use ideahub::models::feedback::{self, FeedbackPatch, FeedbackType, AI_AUTHOR_NAME};

mod common;
use common::{create_idea, create_team, test_pool};

#[tokio::test]
async fn test_comments_are_listed_newest_first() {
    let Some(pool) = test_pool().await else { return };
    let team = create_team(&pool, 1).await;
    let member = &team.members[0];
    let target = create_idea(&pool, &team, member, "Slack integration").await;

    let first = feedback::add_comment(&pool, target.id, member, "  Useful ", Some(4)).await.expect("comment");
    let second = feedback::add_comment(&pool, target.id, &team.founder, "Agreed", None).await.expect("comment");

    assert_eq!(first.content.as_deref(), Some("Useful"));
    assert_eq!(first.feedback_type, FeedbackType::Comment);
    assert_eq!(first.submitted_by_name, member.name);
    assert!(!first.is_board_member);
    assert!(second.is_board_member);

    let thread = feedback::list_for_idea(&pool, target.id).await.expect("thread");
    let ids: Vec<i64> = thread.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_comment_validation_and_tenant() {
    let Some(pool) = test_pool().await else { return };
    let team = create_team(&pool, 0).await;
    let other = create_team(&pool, 0).await;
    let target = create_idea(&pool, &team, &team.founder, "Webhooks").await;

    let err = feedback::add_comment(&pool, target.id, &team.founder, "   ", None).await.expect_err("empty");
    assert!(matches!(err, AppError::Validation(_)));
    let err = feedback::add_comment(&pool, target.id, &team.founder, "Nice", Some(6)).await.expect_err("rating");
    assert!(matches!(err, AppError::Validation(ref m) if m.contains("Rating")));
    let err = feedback::add_comment(&pool, target.id, &other.founder, "Hi", None).await.expect_err("tenant");
    assert!(matches!(err, AppError::AccessDenied));
    let err = feedback::add_comment(&pool, i64::MAX, &team.founder, "Hi", None).await.expect_err("missing");
    assert!(matches!(err, AppError::NotFound("Idea")));
}

#[tokio::test]
async fn test_only_author_edits_but_founder_may_delete() {
    let Some(pool) = test_pool().await else { return };
    let team = create_team(&pool, 2).await;
    let (author, other) = (&team.members[0], &team.members[1]);
    let target = create_idea(&pool, &team, author, "API keys").await;
    let entry = feedback::add_comment(&pool, target.id, author, "Draft", Some(2)).await.expect("comment");

    let patch = FeedbackPatch { content: Some("Edited".to_string()), rating: None };
    for intruder in [other, &team.founder] {
        let err = feedback::update(&pool, entry.id, intruder, &patch).await.expect_err("not author");
        assert!(matches!(err, AppError::AccessDenied));
    }

    let edited = feedback::update(&pool, entry.id, author, &patch).await.expect("author edits");
    assert_eq!(edited.content.as_deref(), Some("Edited"));
    assert_eq!(edited.rating, Some(2));
    assert!(edited.updated_at >= entry.updated_at);

    let err = feedback::delete(&pool, entry.id, other).await.expect_err("not author");
    assert!(matches!(err, AppError::AccessDenied));
    feedback::delete(&pool, entry.id, &team.founder).await.expect("founder deletes");
    let err = feedback::find_by_id(&pool, entry.id).await.expect_err("gone");
    assert!(matches!(err, AppError::NotFound("Feedback")));
}

#[tokio::test]
async fn test_ai_entries_are_immutable() {
    let Some(pool) = test_pool().await else { return };
    let team = create_team(&pool, 0).await;
    let target = create_idea(&pool, &team, &team.founder, "Pricing page").await;

    let mut conn = pool.acquire().await.expect("acquire");
    let entry = feedback::insert_ai_entry(&mut conn, target.id, "Looks promising", 8).await.expect("ai entry");
    drop(conn);
    assert!(entry.is_ai);
    assert_eq!(entry.submitted_by, None);
    assert_eq!(entry.submitted_by_name, AI_AUTHOR_NAME);
    assert_eq!(entry.rating, Some(8));

    let patch = FeedbackPatch { content: Some("Hacked".to_string()), rating: None };
    let err = feedback::update(&pool, entry.id, &team.founder, &patch).await.expect_err("immutable");
    assert!(matches!(err, AppError::AccessDenied));
    let err = feedback::delete(&pool, entry.id, &team.founder).await.expect_err("immutable");
    assert!(matches!(err, AppError::AccessDenied));

    let stored = feedback::find_by_id(&pool, entry.id).await.expect("still there");
    assert_eq!(stored.content.as_deref(), Some("Looks promising"));
}
