//! Apply a workflow transition.
//!
//! Orchestrates the pure machine check around persistence: load the
//! article, validate edge + role, apply with the optimistic status guard,
//! and emit the fact event for notification dispatch. Notification IO is
//! the caller's next step, never this action's.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::common::Role;
use crate::domains::articles::error::WorkflowError;
use crate::domains::articles::events::TransitionEvent;
use crate::domains::articles::machines;
use crate::domains::articles::models::article::{Article, ArticleStatus};
use crate::kernel::ServerDeps;

/// Who is requesting the transition.
///
/// `System` is the scheduled-publish sweep: it acts with the top role and
/// a nil actor id so role-targeted fan-out never suppresses a recipient
/// on its account.
pub enum ActorRef {
    User { id: Uuid, role: Role },
    System,
}

pub async fn apply_transition(
    deps: &ServerDeps,
    article_id: Uuid,
    target: ArticleStatus,
    actor: ActorRef,
    feedback: Option<String>,
    scheduled_at: Option<DateTime<Utc>>,
) -> Result<(Article, TransitionEvent), WorkflowError> {
    let article = Article::find_by_id(article_id, &deps.db_pool)
        .await?
        .ok_or(WorkflowError::NotFound)?;

    let author = deps
        .users
        .find_by_id(article.author_id)
        .await?
        .ok_or(WorkflowError::NotFound)?;

    // Role comes from the verified token, not a re-read, so a mid-session
    // role change takes effect at next login like every other claim.
    let (actor_id, actor_name, actor_role) = match actor {
        ActorRef::User { id, role } => {
            let user = deps
                .users
                .find_by_id(id)
                .await?
                .ok_or(WorkflowError::NotFound)?;
            (user.id, user.name, role)
        }
        ActorRef::System => (Uuid::nil(), "Scheduler".to_string(), Role::SystemAdmin),
    };

    let applied =
        machines::request_transition(&article, target, actor_role, feedback, scheduled_at)?;

    let updated = Article::apply_status(article.id, article.status, &applied, &deps.db_pool)
        .await?
        .ok_or(WorkflowError::InvalidTransition {
            from: article.status,
            to: target,
        })?;

    info!(
        article_id = %updated.id,
        from = %applied.from,
        to = %applied.to,
        actor = %actor_name,
        "Article transition applied"
    );

    let event = TransitionEvent {
        article_id: updated.id,
        article_title: updated.title.clone(),
        old_status: applied.from,
        new_status: updated.status,
        author_id: author.id,
        author_name: author.name,
        author_role: author.role,
        actor_id,
        actor_name,
        actor_role,
        feedback: applied.feedback.clone(),
        published_at: updated.published_at,
        scheduled_at: updated.scheduled_at,
    };

    Ok((updated, event))
}
