//! Notification dispatcher
//!
//! Fans one event out to every resolved recipient over three channels:
//!
//! 1. In-app records, written synchronously. This is the durability
//!    floor: a failed write fails the dispatch (logged, surfaced to the
//!    caller), though the workflow transition that triggered it has
//!    already committed and stays committed.
//! 2. Email, spawned fire-and-forget per recipient. Failures are logged
//!    with recipient context and never retried.
//! 3. Real-time push to currently-connected recipients only; offline
//!    recipients simply miss this channel.
//!
//! Channels are unordered between recipients and failure-isolated: a dead
//! email transport or a torn connection never touches the in-app records.

use tracing::{debug, error, info, warn};

use crate::domains::notifications::events::NotificationEvent;
use crate::domains::notifications::models::notification::{NewNotification, Notification};
use crate::domains::notifications::resolver::{resolve, Audience, NotificationCase};
use crate::domains::users::models::user::User;
use crate::kernel::registry::PushOutcome;
use crate::kernel::ServerDeps;

/// Dispatch an event to all resolved recipients.
///
/// Returns `Err` only when one or more in-app writes failed; email and
/// real-time outcomes never affect the result.
pub async fn notify(deps: &ServerDeps, event: NotificationEvent) -> anyhow::Result<()> {
    let cases = resolve(&event);
    if cases.is_empty() {
        debug!("Event resolved to no notification cases");
        return Ok(());
    }

    let actor_id = event.actor_id();

    // Expand audiences to concrete recipients. Role fan-out never includes
    // the acting user; author/user-directed cases always deliver.
    let mut deliveries: Vec<(NotificationCase, User)> = Vec::new();
    for case in cases {
        match case.audience {
            Audience::User(id) => {
                if let Some(user) = deps.users.find_by_id(id).await? {
                    if user.is_active {
                        deliveries.push((case, user));
                    }
                }
            }
            Audience::Role(role) => {
                for user in deps.users.find_active_by_role(role).await? {
                    if user.id != actor_id {
                        deliveries.push((case.clone(), user));
                    }
                }
            }
        }
    }

    if deliveries.is_empty() {
        info!("No recipients resolved for event; nothing to dispatch");
        return Ok(());
    }

    // Durability floor: every in-app record is written before any other
    // channel is attempted.
    let mut created: Vec<(Notification, User)> = Vec::new();
    let mut failed_writes = 0usize;
    for (case, user) in deliveries {
        let new = NewNotification {
            user_id: user.id,
            title: case.title,
            message: case.message,
            kind: case.kind,
            data: case.data,
        };
        match deps.notifications.create(new).await {
            Ok(notification) => created.push((notification, user)),
            Err(e) => {
                error!(
                    user_id = %user.id,
                    kind = ?case.kind,
                    error = %e,
                    "In-app notification write failed"
                );
                failed_writes += 1;
            }
        }
    }

    // Email: independent background task per recipient, never awaited by
    // the triggering request.
    for (notification, user) in &created {
        let email = deps.email.clone();
        let to = user.email.clone();
        let subject = notification.title.clone();
        let html = render_email(&user.name, &notification.message);
        let user_id = user.id;
        let kind = notification.kind;
        tokio::spawn(async move {
            if let Err(e) = email.send(&to, &subject, &html).await {
                warn!(
                    user_id = %user_id,
                    kind = ?kind,
                    error = %e,
                    "Email delivery failed"
                );
            }
        });
    }

    // Real-time: connected recipients only, no queued replay.
    for (notification, user) in &created {
        let payload = serde_json::json!({
            "type": "notification",
            "notification": notification,
        });
        if deps.registry.push(user.id, payload) == PushOutcome::Dropped {
            debug!(user_id = %user.id, "Recipient offline; real-time push skipped");
        }
    }

    info!(
        recipients = created.len(),
        failed_writes, "Notification dispatch complete"
    );

    if failed_writes > 0 {
        anyhow::bail!("{failed_writes} in-app notification writes failed");
    }
    Ok(())
}

fn render_email(recipient_name: &str, message: &str) -> String {
    format!(
        "<p>Hi {recipient_name},</p>\
         <p>{message}</p>\
         <p>Sign in to Masthead to follow up.</p>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Role;
    use crate::domains::articles::events::TransitionEvent;
    use crate::domains::articles::models::article::ArticleStatus;
    use crate::domains::notifications::events::NotificationKind;
    use crate::kernel::test_dependencies::{
        test_user, MockEmailService, MockUserDirectory, TestDependencies,
    };
    use crate::kernel::test_dependencies::MockNotificationStore;
    use std::time::Duration;
    use uuid::Uuid;

    fn transition_event(
        author: &User,
        actor: &User,
        old_status: ArticleStatus,
        new_status: ArticleStatus,
        feedback: Option<&str>,
    ) -> NotificationEvent {
        NotificationEvent::Transition(TransitionEvent {
            article_id: Uuid::new_v4(),
            article_title: "Budget Cuts Hit the Band Room".to_string(),
            old_status,
            new_status,
            author_id: author.id,
            author_name: author.name.clone(),
            author_role: author.role,
            actor_id: actor.id,
            actor_name: actor.name.clone(),
            actor_role: actor.role,
            feedback: feedback.map(String::from),
            published_at: None,
            scheduled_at: None,
        })
    }

    #[tokio::test]
    async fn test_submission_fans_out_to_section_heads_and_author() {
        let author = test_user("Alex Reyes", Role::Staff);
        let head_one = test_user("Morgan Diaz", Role::SectionHead);
        let head_two = test_user("Sam Okafor", Role::SectionHead);

        let test_deps = TestDependencies::new().mock_users(
            MockUserDirectory::new()
                .with_user(author.clone())
                .with_user(head_one.clone())
                .with_user(head_two.clone()),
        );
        let deps = test_deps.to_deps();

        let event = transition_event(
            &author,
            &author,
            ArticleStatus::Draft,
            ArticleStatus::InReview,
            None,
        );
        notify(&deps, event).await.unwrap();

        // One ARTICLE_SUBMITTED record per section head, one generic
        // status-changed record for the author.
        for head in [&head_one, &head_two] {
            let records = test_deps.store.created_for(head.id);
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].kind, NotificationKind::ArticleSubmitted);
        }
        let author_records = test_deps.store.created_for(author.id);
        assert_eq!(author_records.len(), 1);
        assert_eq!(author_records[0].kind, NotificationKind::ArticleStatusChanged);
    }

    #[tokio::test]
    async fn test_rejection_reaches_exactly_the_author_with_feedback() {
        let author = test_user("Alex Reyes", Role::Staff);
        let head = test_user("Morgan Diaz", Role::SectionHead);

        let test_deps = TestDependencies::new().mock_users(
            MockUserDirectory::new()
                .with_user(author.clone())
                .with_user(head.clone()),
        );
        let deps = test_deps.to_deps();

        let event = transition_event(
            &author,
            &head,
            ArticleStatus::InReview,
            ArticleStatus::NeedsRevision,
            Some("Add sources"),
        );
        notify(&deps, event).await.unwrap();

        let all = test_deps.store.created();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].user_id, author.id);
        assert_eq!(all[0].kind, NotificationKind::ArticleRejected);
        assert_eq!(all[0].data["feedback"], "Add sources");
    }

    #[tokio::test]
    async fn test_channel_isolation_under_email_and_push_failure() {
        let author = test_user("Alex Reyes", Role::Staff);
        let adviser = test_user("Dana Whitfield", Role::Adviser);

        let test_deps = TestDependencies::new()
            .mock_users(
                MockUserDirectory::new()
                    .with_user(author.clone())
                    .with_user(adviser.clone()),
            )
            .mock_email(MockEmailService::failing());
        let deps = test_deps.to_deps();

        // A dead real-time consumer: connect then drop the receiver.
        let (_guard, rx) = deps.registry.connect(adviser.id);
        drop(rx);

        let editor = test_user("Morgan Diaz", Role::EditorInChief);
        let event = transition_event(
            &author,
            &editor,
            ArticleStatus::Approved,
            ArticleStatus::Published,
            None,
        );
        notify(&deps, event).await.unwrap();

        // Both failing channels notwithstanding, the in-app records exist.
        assert_eq!(test_deps.store.created_for(author.id).len(), 1);
        assert_eq!(test_deps.store.created_for(adviser.id).len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_fails_dispatch() {
        let author = test_user("Alex Reyes", Role::Staff);
        let head = test_user("Morgan Diaz", Role::SectionHead);

        let test_deps = TestDependencies::new()
            .mock_users(
                MockUserDirectory::new()
                    .with_user(author.clone())
                    .with_user(head.clone()),
            )
            .mock_store(MockNotificationStore::failing());
        let deps = test_deps.to_deps();

        let event = transition_event(
            &author,
            &head,
            ArticleStatus::InReview,
            ArticleStatus::NeedsRevision,
            None,
        );
        assert!(notify(&deps, event).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_recipient_set_is_not_an_error() {
        let author = test_user("Alex Reyes", Role::Staff);
        // Directory knows nobody: the author lookup misses too.
        let test_deps = TestDependencies::new();
        let deps = test_deps.to_deps();

        let actor = test_user("Morgan Diaz", Role::SectionHead);
        let event = transition_event(
            &author,
            &actor,
            ArticleStatus::InReview,
            ArticleStatus::Approved,
            None,
        );
        assert!(notify(&deps, event).await.is_ok());
        assert!(test_deps.store.created().is_empty());
    }

    #[tokio::test]
    async fn test_actor_excluded_from_role_fan_out() {
        let author = test_user("Alex Reyes", Role::Staff);
        let approving_editor = test_user("Morgan Diaz", Role::EditorInChief);
        let other_editor = test_user("Sam Okafor", Role::EditorInChief);

        let test_deps = TestDependencies::new().mock_users(
            MockUserDirectory::new()
                .with_user(author.clone())
                .with_user(approving_editor.clone())
                .with_user(other_editor.clone()),
        );
        let deps = test_deps.to_deps();

        let event = transition_event(
            &author,
            &approving_editor,
            ArticleStatus::InReview,
            ArticleStatus::Approved,
            None,
        );
        notify(&deps, event).await.unwrap();

        assert!(test_deps.store.created_for(approving_editor.id).is_empty());
        assert_eq!(test_deps.store.created_for(other_editor.id).len(), 1);
    }

    #[tokio::test]
    async fn test_email_carries_recipient_and_subject() {
        let author = test_user("Alex Reyes", Role::Staff);
        let head = test_user("Morgan Diaz", Role::SectionHead);

        let test_deps = TestDependencies::new().mock_users(
            MockUserDirectory::new()
                .with_user(author.clone())
                .with_user(head.clone()),
        );
        let deps = test_deps.to_deps();

        let event = transition_event(
            &author,
            &head,
            ArticleStatus::InReview,
            ArticleStatus::NeedsRevision,
            Some("Add sources"),
        );
        notify(&deps, event).await.unwrap();

        // Email tasks are fire-and-forget; give them a beat to run.
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(test_deps.email.was_sent_to(&author.email));
        let sent = test_deps.email.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "Revision requested");
        assert!(sent[0].2.contains("Add sources"));
    }

    #[tokio::test]
    async fn test_realtime_push_reaches_connected_recipient() {
        let author = test_user("Alex Reyes", Role::Staff);
        let head = test_user("Morgan Diaz", Role::SectionHead);

        let test_deps = TestDependencies::new().mock_users(
            MockUserDirectory::new()
                .with_user(author.clone())
                .with_user(head.clone()),
        );
        let deps = test_deps.to_deps();

        let (_guard, mut rx) = deps.registry.connect(author.id);

        let event = transition_event(
            &author,
            &head,
            ArticleStatus::InReview,
            ArticleStatus::NeedsRevision,
            None,
        );
        notify(&deps, event).await.unwrap();

        let payload = rx.recv().await.unwrap();
        assert_eq!(payload["type"], "notification");
        assert_eq!(
            payload["notification"]["kind"],
            serde_json::json!("ARTICLE_REJECTED")
        );
        assert_eq!(payload["notification"]["userId"], serde_json::json!(author.id));
    }

    #[tokio::test]
    async fn test_inactive_role_holders_are_skipped() {
        let author = test_user("Alex Reyes", Role::Staff);
        let mut inactive_head = test_user("Morgan Diaz", Role::SectionHead);
        inactive_head.is_active = false;

        let test_deps = TestDependencies::new().mock_users(
            MockUserDirectory::new()
                .with_user(author.clone())
                .with_user(inactive_head.clone()),
        );
        let deps = test_deps.to_deps();

        let event = transition_event(
            &author,
            &author,
            ArticleStatus::Draft,
            ArticleStatus::InReview,
            None,
        );
        notify(&deps, event).await.unwrap();

        assert!(test_deps.store.created_for(inactive_head.id).is_empty());
        // The author still gets the generic case.
        assert_eq!(test_deps.store.created_for(author.id).len(), 1);
    }
}
