//! Article workflow state machine
//!
//! Pure decision logic - NO IO, only transition validation and side-effect
//! computation. Persistence and notification dispatch live in the actions
//! layer; this module is what the table-driven workflow tests exercise.

use chrono::{DateTime, Utc};

use crate::common::{has_permission, Permission, Role};
use crate::domains::articles::error::WorkflowError;
use crate::domains::articles::models::article::{Article, ArticleStatus};

/// Direct successors of a status in the transition table.
///
/// ```text
/// DRAFT          -> IN_REVIEW
/// IN_REVIEW      -> NEEDS_REVISION, APPROVED
/// NEEDS_REVISION -> IN_REVIEW
/// APPROVED       -> IN_REVIEW, SCHEDULED, PUBLISHED
/// SCHEDULED      -> PUBLISHED
/// PUBLISHED      -> ARCHIVED
/// ARCHIVED       -> IN_REVIEW   (privileged restore)
/// ```
pub fn successors(status: ArticleStatus) -> &'static [ArticleStatus] {
    match status {
        ArticleStatus::Draft => &[ArticleStatus::InReview],
        ArticleStatus::InReview => &[ArticleStatus::NeedsRevision, ArticleStatus::Approved],
        ArticleStatus::NeedsRevision => &[ArticleStatus::InReview],
        ArticleStatus::Approved => &[
            ArticleStatus::InReview,
            ArticleStatus::Scheduled,
            ArticleStatus::Published,
        ],
        ArticleStatus::Scheduled => &[ArticleStatus::Published],
        ArticleStatus::Published => &[ArticleStatus::Archived],
        ArticleStatus::Archived => &[ArticleStatus::InReview],
    }
}

/// The permission gating a specific edge. `None` means the edge does not
/// exist; role gating is a separate axis from the table itself.
pub fn edge_permission(from: ArticleStatus, to: ArticleStatus) -> Option<Permission> {
    use ArticleStatus::*;
    match (from, to) {
        (Draft, InReview) => Some(Permission::ArticleSubmit),
        (InReview, NeedsRevision) => Some(Permission::ArticleReject),
        (InReview, Approved) => Some(Permission::ArticleApprove),
        (NeedsRevision, InReview) => Some(Permission::ArticleSubmit),
        (Approved, InReview) => Some(Permission::ArticleReturn),
        (Approved, Scheduled) => Some(Permission::ArticleSchedule),
        (Approved, Published) => Some(Permission::ArticlePublish),
        (Scheduled, Published) => Some(Permission::ArticlePublish),
        (Published, Archived) => Some(Permission::ArticleArchive),
        (Archived, InReview) => Some(Permission::ArticleRestore),
        _ => None,
    }
}

/// The computed outcome of a validated transition, ready to persist.
#[derive(Debug, Clone)]
pub struct AppliedTransition {
    pub from: ArticleStatus,
    pub to: ArticleStatus,
    /// Set only on first entry into PUBLISHED; never overwritten.
    pub published_at: Option<DateTime<Utc>>,
    /// Set only on entry into SCHEDULED.
    pub scheduled_at: Option<DateTime<Utc>>,
    pub feedback: Option<String>,
}

/// Validate a requested transition against the table and the capability
/// matrix, and compute its side-effect timestamps.
///
/// This never performs notification IO; it is a pure check plus timestamp
/// computation so workflow correctness stays independently testable.
pub fn request_transition(
    article: &Article,
    target: ArticleStatus,
    actor_role: Role,
    feedback: Option<String>,
    scheduled_at: Option<DateTime<Utc>>,
) -> Result<AppliedTransition, WorkflowError> {
    let permission =
        edge_permission(article.status, target).ok_or(WorkflowError::InvalidTransition {
            from: article.status,
            to: target,
        })?;

    if !has_permission(actor_role, permission) {
        return Err(WorkflowError::Forbidden {
            role: actor_role,
            permission,
        });
    }

    let now = Utc::now();
    let mut applied = AppliedTransition {
        from: article.status,
        to: target,
        published_at: None,
        scheduled_at: None,
        feedback,
    };

    if target == ArticleStatus::Published && article.published_at.is_none() {
        applied.published_at = Some(now);
    }

    if target == ArticleStatus::Scheduled {
        let at = scheduled_at.ok_or(WorkflowError::InvalidSchedule)?;
        if at <= now {
            return Err(WorkflowError::InvalidSchedule);
        }
        applied.scheduled_at = Some(at);
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn article(status: ArticleStatus) -> Article {
        Article {
            id: Uuid::new_v4(),
            title: "Test Article".to_string(),
            status,
            author_id: Uuid::new_v4(),
            published_at: None,
            scheduled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(
        from: ArticleStatus,
        to: ArticleStatus,
        role: Role,
    ) -> Result<AppliedTransition, WorkflowError> {
        // Supply a valid future schedule so scheduling edges are judged on
        // the table and role alone.
        request_transition(
            &article(from),
            to,
            role,
            None,
            Some(Utc::now() + Duration::hours(2)),
        )
    }

    /// For all (status, role, target): the transition succeeds iff the
    /// edge exists AND the role holds the edge's permission.
    #[test]
    fn test_exhaustive_transition_table() {
        for from in ArticleStatus::ALL {
            for to in ArticleStatus::ALL {
                for role in Role::ALL {
                    let result = request(from, to, role);
                    match edge_permission(from, to) {
                        None => assert!(
                            matches!(result, Err(WorkflowError::InvalidTransition { .. })),
                            "{from} -> {to} must be invalid for {role}"
                        ),
                        Some(permission) => {
                            if has_permission(role, permission) {
                                assert!(
                                    result.is_ok(),
                                    "{from} -> {to} must succeed for {role}"
                                );
                            } else {
                                assert!(
                                    matches!(result, Err(WorkflowError::Forbidden { .. })),
                                    "{from} -> {to} must be forbidden for {role}"
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_successors_agree_with_edge_permissions() {
        for from in ArticleStatus::ALL {
            for to in ArticleStatus::ALL {
                assert_eq!(
                    successors(from).contains(&to),
                    edge_permission(from, to).is_some(),
                );
            }
        }
    }

    #[test]
    fn test_second_approve_is_rejected() {
        // First approval succeeds; approving the already-approved article
        // again is InvalidTransition, not silently accepted.
        let approved = request(ArticleStatus::InReview, ArticleStatus::Approved, Role::SectionHead);
        assert!(approved.is_ok());

        let again = request(ArticleStatus::Approved, ArticleStatus::Approved, Role::SectionHead);
        assert!(matches!(
            again,
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_publish_sets_published_at_once() {
        let applied = request(ArticleStatus::Approved, ArticleStatus::Published, Role::EditorInChief)
            .unwrap();
        assert!(applied.published_at.is_some());

        // An article that already carries a publish timestamp (archived
        // then restored and re-published) keeps the original one.
        let mut already_published = article(ArticleStatus::Approved);
        already_published.published_at = Some(Utc::now() - Duration::days(30));
        let applied = request_transition(
            &already_published,
            ArticleStatus::Published,
            Role::EditorInChief,
            None,
            None,
        )
        .unwrap();
        assert!(applied.published_at.is_none());
    }

    #[test]
    fn test_schedule_requires_future_time() {
        let missing = request_transition(
            &article(ArticleStatus::Approved),
            ArticleStatus::Scheduled,
            Role::EditorInChief,
            None,
            None,
        );
        assert!(matches!(missing, Err(WorkflowError::InvalidSchedule)));

        let past = request_transition(
            &article(ArticleStatus::Approved),
            ArticleStatus::Scheduled,
            Role::EditorInChief,
            None,
            Some(Utc::now() - Duration::minutes(5)),
        );
        assert!(matches!(past, Err(WorkflowError::InvalidSchedule)));

        let future = request_transition(
            &article(ArticleStatus::Approved),
            ArticleStatus::Scheduled,
            Role::EditorInChief,
            None,
            Some(Utc::now() + Duration::hours(1)),
        )
        .unwrap();
        assert!(future.scheduled_at.is_some());
    }

    #[test]
    fn test_restore_gated_to_top_two_roles() {
        for role in [Role::Staff, Role::SectionHead, Role::EditorInChief] {
            assert!(matches!(
                request(ArticleStatus::Archived, ArticleStatus::InReview, role),
                Err(WorkflowError::Forbidden { .. })
            ));
        }
        for role in [Role::Adviser, Role::SystemAdmin] {
            assert!(request(ArticleStatus::Archived, ArticleStatus::InReview, role).is_ok());
        }
    }

    #[test]
    fn test_no_edge_out_of_published_except_archive() {
        // Scenario: article in PUBLISHED, actor requests IN_REVIEW.
        let result = request(ArticleStatus::Published, ArticleStatus::InReview, Role::SystemAdmin);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_feedback_is_carried() {
        let applied = request_transition(
            &article(ArticleStatus::InReview),
            ArticleStatus::NeedsRevision,
            Role::SectionHead,
            Some("Add sources".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(applied.feedback.as_deref(), Some("Add sources"));
    }
}
