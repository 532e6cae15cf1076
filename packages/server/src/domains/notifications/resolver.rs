//! Recipient resolver
//!
//! Pure dispatch logic - NO IO. Maps an event to the notification cases it
//! produces: which audience, which kind, which message. The dispatcher
//! expands role audiences to concrete users afterwards.
//!
//! Resolution is total for workflow transitions: every legal transition
//! yields at least the generic author case, so no transition is ever
//! silently unnotified.

use serde_json::json;
use uuid::Uuid;

use crate::common::Role;
use crate::domains::articles::events::TransitionEvent;
use crate::domains::articles::models::article::ArticleStatus;
use crate::domains::notifications::events::{NotificationEvent, NotificationKind};

/// Who a case targets. Role audiences are expanded to all active holders
/// of that role, minus the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    User(Uuid),
    Role(Role),
}

/// One resolved notification case, ready for fan-out.
#[derive(Debug, Clone)]
pub struct NotificationCase {
    pub audience: Audience,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
}

/// Resolve an event into its notification cases.
pub fn resolve(event: &NotificationEvent) -> Vec<NotificationCase> {
    match event {
        NotificationEvent::Transition(t) => resolve_transition(t),
        NotificationEvent::CommentPosted {
            article_id,
            article_title,
            article_author_id,
            commenter_id,
            commenter_name,
        } => {
            // Authors are not told about their own comments.
            if commenter_id == article_author_id {
                return Vec::new();
            }
            vec![NotificationCase {
                audience: Audience::User(*article_author_id),
                kind: NotificationKind::CommentPosted,
                title: "New comment".to_string(),
                message: format!("{commenter_name} commented on \"{article_title}\"."),
                data: json!({
                    "articleId": article_id,
                    "articleTitle": article_title,
                    "commenterName": commenter_name,
                }),
            }]
        }
        NotificationEvent::CommentStatusChanged {
            article_title,
            comment_author_id,
            moderator_id: _,
            approved,
        } => {
            let (title, message) = if *approved {
                (
                    "Comment approved",
                    format!("Your comment on \"{article_title}\" was approved."),
                )
            } else {
                (
                    "Comment hidden",
                    format!("Your comment on \"{article_title}\" was hidden by a moderator."),
                )
            };
            vec![NotificationCase {
                audience: Audience::User(*comment_author_id),
                kind: NotificationKind::CommentStatusChanged,
                title: title.to_string(),
                message,
                data: json!({
                    "articleTitle": article_title,
                    "approved": approved,
                }),
            }]
        }
        NotificationEvent::FlipbookCreated {
            flipbook_id,
            title,
            creator_id: _,
            creator_name,
        } => flipbook_cases(
            NotificationKind::FlipbookCreated,
            "New flipbook issue",
            format!("{creator_name} created the flipbook \"{title}\"."),
            *flipbook_id,
            title,
        ),
        NotificationEvent::FlipbookUpdated {
            flipbook_id,
            title,
            editor_id: _,
            editor_name,
        } => flipbook_cases(
            NotificationKind::FlipbookUpdated,
            "Flipbook updated",
            format!("{editor_name} updated the flipbook \"{title}\"."),
            *flipbook_id,
            title,
        ),
    }
}

/// Flipbook events go to the publication-management tiers.
fn flipbook_cases(
    kind: NotificationKind,
    title: &str,
    message: String,
    flipbook_id: Uuid,
    flipbook_title: &str,
) -> Vec<NotificationCase> {
    let data = json!({
        "flipbookId": flipbook_id,
        "flipbookTitle": flipbook_title,
    });
    [Role::EditorInChief, Role::Adviser]
        .into_iter()
        .map(|role| NotificationCase {
            audience: Audience::Role(role),
            kind,
            title: title.to_string(),
            message: message.clone(),
            data: data.clone(),
        })
        .collect()
}

fn transition_data(t: &TransitionEvent) -> serde_json::Value {
    json!({
        "articleId": t.article_id,
        "articleTitle": t.article_title,
        "authorName": t.author_name,
        "actorName": t.actor_name,
        "oldStatus": t.old_status,
        "newStatus": t.new_status,
        "feedback": t.feedback,
    })
}

fn resolve_transition(t: &TransitionEvent) -> Vec<NotificationCase> {
    use ArticleStatus::*;

    let data = transition_data(t);
    let mut cases = Vec::new();

    match (t.old_status, t.new_status) {
        // A staff article entering review lands in the section heads'
        // queue, whether freshly submitted or resubmitted after revision.
        (Draft | NeedsRevision, InReview) if t.author_role == Role::Staff => {
            cases.push(NotificationCase {
                audience: Audience::Role(Role::SectionHead),
                kind: NotificationKind::ArticleSubmitted,
                title: "New article submitted".to_string(),
                message: format!(
                    "{} submitted \"{}\" for review.",
                    t.author_name, t.article_title
                ),
                data: data.clone(),
            });
        }

        // An approved article pulled back by the top tier returns to the
        // section heads, with the editor's feedback attached.
        (Approved, InReview) => {
            let mut message = format!(
                "{} returned \"{}\" to review.",
                t.actor_name, t.article_title
            );
            if let Some(feedback) = &t.feedback {
                message.push_str(&format!(" Feedback: {feedback}"));
            }
            cases.push(NotificationCase {
                audience: Audience::Role(Role::SectionHead),
                kind: NotificationKind::ArticleReturned,
                title: "Article returned for review".to_string(),
                message,
                data: data.clone(),
            });
        }

        (InReview, Approved) => {
            cases.push(NotificationCase {
                audience: Audience::Role(Role::EditorInChief),
                kind: NotificationKind::ArticleApproved,
                title: "Article approved".to_string(),
                message: format!(
                    "{} approved \"{}\". It is ready for publishing.",
                    t.actor_name, t.article_title
                ),
                data: data.clone(),
            });
        }

        (InReview, NeedsRevision) => {
            let mut message = format!(
                "{} requested changes to \"{}\".",
                t.actor_name, t.article_title
            );
            if let Some(feedback) = &t.feedback {
                message.push_str(&format!(" Feedback: {feedback}"));
            }
            cases.push(NotificationCase {
                audience: Audience::User(t.author_id),
                kind: NotificationKind::ArticleRejected,
                title: "Revision requested".to_string(),
                message,
                data: data.clone(),
            });
        }

        // Publication always congratulates the author and always informs
        // the advisers; a section head's own article is additionally
        // visible to the editors-in-chief (peer-visibility rule).
        (_, Published) => {
            cases.push(NotificationCase {
                audience: Audience::User(t.author_id),
                kind: NotificationKind::ArticlePublished,
                title: "Your article was published".to_string(),
                message: format!("Your article \"{}\" has been published.", t.article_title),
                data: data.clone(),
            });
            cases.push(NotificationCase {
                audience: Audience::Role(Role::Adviser),
                kind: NotificationKind::ArticlePublished,
                title: "Article published".to_string(),
                message: format!(
                    "\"{}\" by {} was published.",
                    t.article_title, t.author_name
                ),
                data: data.clone(),
            });
            if t.author_role == Role::SectionHead {
                cases.push(NotificationCase {
                    audience: Audience::Role(Role::EditorInChief),
                    kind: NotificationKind::ArticlePublished,
                    title: "Article published".to_string(),
                    message: format!(
                        "\"{}\" by {} was published.",
                        t.article_title, t.author_name
                    ),
                    data: data.clone(),
                });
            }
        }

        (_, Scheduled) => {
            cases.push(NotificationCase {
                audience: Audience::User(t.author_id),
                kind: NotificationKind::ArticleScheduled,
                title: "Article scheduled".to_string(),
                message: format!(
                    "Your article \"{}\" is scheduled for publication.",
                    t.article_title
                ),
                data: data.clone(),
            });
        }

        (_, Archived) => {
            cases.push(NotificationCase {
                audience: Audience::User(t.author_id),
                kind: NotificationKind::ArticleArchived,
                title: "Article archived".to_string(),
                message: format!("Your article \"{}\" was archived.", t.article_title),
                data: data.clone(),
            });
        }

        _ => {}
    }

    // Totality: the author always hears about a status change, even when
    // no specialized case targeted them.
    if !cases
        .iter()
        .any(|c| c.audience == Audience::User(t.author_id))
    {
        cases.push(NotificationCase {
            audience: Audience::User(t.author_id),
            kind: NotificationKind::ArticleStatusChanged,
            title: "Article status updated".to_string(),
            message: format!(
                "\"{}\" moved from {} to {}.",
                t.article_title, t.old_status, t.new_status
            ),
            data,
        });
    }

    cases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::articles::machines::successors;

    fn transition(
        old_status: ArticleStatus,
        new_status: ArticleStatus,
        author_role: Role,
        actor_role: Role,
        feedback: Option<&str>,
    ) -> TransitionEvent {
        TransitionEvent {
            article_id: Uuid::new_v4(),
            article_title: "The Long Winter".to_string(),
            old_status,
            new_status,
            author_id: Uuid::new_v4(),
            author_name: "Alex Reyes".to_string(),
            author_role,
            actor_id: Uuid::new_v4(),
            actor_name: "Morgan Diaz".to_string(),
            actor_role,
            feedback: feedback.map(String::from),
            published_at: None,
            scheduled_at: None,
        }
    }

    #[test]
    fn test_staff_submission_notifies_section_heads_and_author() {
        let t = transition(
            ArticleStatus::Draft,
            ArticleStatus::InReview,
            Role::Staff,
            Role::Staff,
            None,
        );
        let author_id = t.author_id;
        let cases = resolve(&NotificationEvent::Transition(t));

        assert_eq!(cases.len(), 2);
        assert!(cases.iter().any(|c| {
            c.audience == Audience::Role(Role::SectionHead)
                && c.kind == NotificationKind::ArticleSubmitted
        }));
        assert!(cases.iter().any(|c| {
            c.audience == Audience::User(author_id)
                && c.kind == NotificationKind::ArticleStatusChanged
        }));
    }

    #[test]
    fn test_rejection_targets_exactly_the_author_with_feedback() {
        let t = transition(
            ArticleStatus::InReview,
            ArticleStatus::NeedsRevision,
            Role::Staff,
            Role::SectionHead,
            Some("Add sources"),
        );
        let author_id = t.author_id;
        let cases = resolve(&NotificationEvent::Transition(t));

        assert_eq!(cases.len(), 1);
        let case = &cases[0];
        assert_eq!(case.audience, Audience::User(author_id));
        assert_eq!(case.kind, NotificationKind::ArticleRejected);
        assert_eq!(case.data["feedback"], "Add sources");
        assert!(case.message.contains("Add sources"));
    }

    #[test]
    fn test_approval_notifies_editors_in_chief() {
        let t = transition(
            ArticleStatus::InReview,
            ArticleStatus::Approved,
            Role::Staff,
            Role::SectionHead,
            None,
        );
        let cases = resolve(&NotificationEvent::Transition(t));
        assert!(cases.iter().any(|c| {
            c.audience == Audience::Role(Role::EditorInChief)
                && c.kind == NotificationKind::ArticleApproved
        }));
    }

    #[test]
    fn test_returned_article_carries_feedback_to_section_heads() {
        let t = transition(
            ArticleStatus::Approved,
            ArticleStatus::InReview,
            Role::Staff,
            Role::EditorInChief,
            Some("Hold for the print issue"),
        );
        let cases = resolve(&NotificationEvent::Transition(t));
        let returned = cases
            .iter()
            .find(|c| c.kind == NotificationKind::ArticleReturned)
            .unwrap();
        assert_eq!(returned.audience, Audience::Role(Role::SectionHead));
        assert!(returned.message.contains("Hold for the print issue"));
    }

    #[test]
    fn test_publish_notifies_author_and_advisers() {
        let t = transition(
            ArticleStatus::Approved,
            ArticleStatus::Published,
            Role::Staff,
            Role::EditorInChief,
            None,
        );
        let author_id = t.author_id;
        let cases = resolve(&NotificationEvent::Transition(t));

        assert_eq!(cases.len(), 2);
        assert!(cases
            .iter()
            .any(|c| c.audience == Audience::User(author_id)
                && c.kind == NotificationKind::ArticlePublished));
        assert!(cases
            .iter()
            .any(|c| c.audience == Audience::Role(Role::Adviser)));
    }

    #[test]
    fn test_section_head_publish_adds_peer_visibility() {
        let t = transition(
            ArticleStatus::Scheduled,
            ArticleStatus::Published,
            Role::SectionHead,
            Role::EditorInChief,
            None,
        );
        let cases = resolve(&NotificationEvent::Transition(t));

        assert_eq!(cases.len(), 3);
        assert!(cases
            .iter()
            .any(|c| c.audience == Audience::Role(Role::EditorInChief)));
    }

    /// Every legal transition resolves to at least one case, and the
    /// author is always among the targets.
    #[test]
    fn test_resolution_is_total_over_legal_transitions() {
        for from in ArticleStatus::ALL {
            for to in successors(from).iter().copied() {
                for author_role in Role::ALL {
                    let t = transition(from, to, author_role, Role::SystemAdmin, None);
                    let author_id = t.author_id;
                    let cases = resolve(&NotificationEvent::Transition(t));
                    assert!(
                        !cases.is_empty(),
                        "{from} -> {to} (author {author_role}) produced no cases"
                    );
                    assert!(
                        cases
                            .iter()
                            .any(|c| c.audience == Audience::User(author_id)),
                        "{from} -> {to} (author {author_role}) skipped the author"
                    );
                }
            }
        }
    }

    #[test]
    fn test_own_comment_produces_no_cases() {
        let author = Uuid::new_v4();
        let event = NotificationEvent::CommentPosted {
            article_id: Uuid::new_v4(),
            article_title: "The Long Winter".to_string(),
            article_author_id: author,
            commenter_id: author,
            commenter_name: "Alex Reyes".to_string(),
        };
        assert!(resolve(&event).is_empty());
    }

    #[test]
    fn test_comment_notifies_article_author() {
        let author = Uuid::new_v4();
        let event = NotificationEvent::CommentPosted {
            article_id: Uuid::new_v4(),
            article_title: "The Long Winter".to_string(),
            article_author_id: author,
            commenter_id: Uuid::new_v4(),
            commenter_name: "Jordan Lee".to_string(),
        };
        let cases = resolve(&event);
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].audience, Audience::User(author));
        assert_eq!(cases[0].kind, NotificationKind::CommentPosted);
    }

    #[test]
    fn test_flipbook_created_targets_management_tiers() {
        let event = NotificationEvent::FlipbookCreated {
            flipbook_id: Uuid::new_v4(),
            title: "Spring Issue".to_string(),
            creator_id: Uuid::new_v4(),
            creator_name: "Sam Okafor".to_string(),
        };
        let cases = resolve(&event);
        let audiences: Vec<_> = cases.iter().map(|c| c.audience).collect();
        assert!(audiences.contains(&Audience::Role(Role::EditorInChief)));
        assert!(audiences.contains(&Audience::Role(Role::Adviser)));
    }
}
