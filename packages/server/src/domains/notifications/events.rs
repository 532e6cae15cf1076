//! Notification domain events
//!
//! Events are immutable facts that feed the recipient resolver: workflow
//! transitions plus the handful of triggers unrelated to article status.
//! Each carries the names its message templates need so resolution stays
//! pure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::articles::events::TransitionEvent;

/// Closed set of notification kinds.
///
/// A tagged variant, not a free-form string, so the resolver's dispatch
/// is exhaustive and the wire/database form stays stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "notification_kind")]
pub enum NotificationKind {
    #[sqlx(rename = "ARTICLE_SUBMITTED")]
    ArticleSubmitted,
    #[sqlx(rename = "ARTICLE_APPROVED")]
    ArticleApproved,
    #[sqlx(rename = "ARTICLE_REJECTED")]
    ArticleRejected,
    #[sqlx(rename = "ARTICLE_RETURNED")]
    ArticleReturned,
    #[sqlx(rename = "ARTICLE_PUBLISHED")]
    ArticlePublished,
    #[sqlx(rename = "ARTICLE_SCHEDULED")]
    ArticleScheduled,
    #[sqlx(rename = "ARTICLE_ARCHIVED")]
    ArticleArchived,
    #[sqlx(rename = "ARTICLE_STATUS_CHANGED")]
    ArticleStatusChanged,
    #[sqlx(rename = "COMMENT_POSTED")]
    CommentPosted,
    #[sqlx(rename = "COMMENT_STATUS_CHANGED")]
    CommentStatusChanged,
    #[sqlx(rename = "FLIPBOOK_CREATED")]
    FlipbookCreated,
    #[sqlx(rename = "FLIPBOOK_UPDATED")]
    FlipbookUpdated,
    #[sqlx(rename = "INFO")]
    Info,
    #[sqlx(rename = "WARNING")]
    Warning,
    #[sqlx(rename = "SUCCESS")]
    Success,
    #[sqlx(rename = "ERROR")]
    Error,
}

/// Triggers the dispatcher reacts to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NotificationEvent {
    /// An article moved along a workflow edge
    Transition(TransitionEvent),

    /// A reader commented on an article
    CommentPosted {
        article_id: Uuid,
        article_title: String,
        article_author_id: Uuid,
        commenter_id: Uuid,
        commenter_name: String,
    },

    /// A moderator approved or hid a comment
    CommentStatusChanged {
        article_title: String,
        comment_author_id: Uuid,
        moderator_id: Uuid,
        approved: bool,
    },

    /// A new flipbook issue was created
    FlipbookCreated {
        flipbook_id: Uuid,
        title: String,
        creator_id: Uuid,
        creator_name: String,
    },

    /// An existing flipbook issue was updated
    FlipbookUpdated {
        flipbook_id: Uuid,
        title: String,
        editor_id: Uuid,
        editor_name: String,
    },
}

impl NotificationEvent {
    /// The user whose action produced the event. Role-targeted fan-out
    /// never notifies an actor of their own action.
    pub fn actor_id(&self) -> Uuid {
        match self {
            NotificationEvent::Transition(t) => t.actor_id,
            NotificationEvent::CommentPosted { commenter_id, .. } => *commenter_id,
            NotificationEvent::CommentStatusChanged { moderator_id, .. } => *moderator_id,
            NotificationEvent::FlipbookCreated { creator_id, .. } => *creator_id,
            NotificationEvent::FlipbookUpdated { editor_id, .. } => *editor_id,
        }
    }
}
