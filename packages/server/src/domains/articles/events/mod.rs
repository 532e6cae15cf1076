//! Article domain events
//!
//! A `TransitionEvent` is the immutable fact emitted by a successful
//! workflow change. It carries everything the notification resolver needs
//! so no further lookups happen during fan-out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Role;
use crate::domains::articles::models::article::ArticleStatus;

/// Fact event for an applied status transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub article_id: Uuid,
    pub article_title: String,
    pub old_status: ArticleStatus,
    pub new_status: ArticleStatus,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_role: Role,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub actor_role: Role,
    pub feedback: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
}
