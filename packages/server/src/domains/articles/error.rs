use thiserror::Error;

use crate::common::{Permission, Role};
use crate::domains::articles::models::article::ArticleStatus;

/// Workflow errors surfaced to the caller of a transition request.
///
/// `InvalidTransition` is also the shape a lost optimistic race takes:
/// the precondition status no longer matches, so the requested edge no
/// longer exists from the article's current position.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("cannot move article from {from} to {to}")]
    InvalidTransition {
        from: ArticleStatus,
        to: ArticleStatus,
    },

    #[error("role {role} lacks permission {permission}")]
    Forbidden { role: Role, permission: Permission },

    #[error("article not found")]
    NotFound,

    #[error("scheduling requires a publish time in the future")]
    InvalidSchedule,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
