//! Scheduled background tasks.
//!
//! The publish sweep moves due SCHEDULED articles into PUBLISHED through
//! the same workflow path a user request takes, so side-effect timestamps
//! and notification fan-out behave identically.
//!
//! ```text
//! Sweep (every minute)
//!     │
//!     └─► find_due_scheduled()
//!             └─► For each article → apply_transition(System) → notify()
//! ```

use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::domains::articles::actions::{apply_transition, ActorRef};
use crate::domains::articles::models::article::{Article, ArticleStatus};
use crate::domains::notifications::dispatcher::notify;
use crate::domains::notifications::events::NotificationEvent;
use crate::kernel::ServerDeps;

/// Spawn the periodic publish sweep as a background task
pub fn spawn_publish_sweep(deps: ServerDeps, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(e) = publish_due_articles(&deps).await {
                error!(error = %e, "Publish sweep failed");
            }
        }
    })
}

/// Publish every scheduled article whose time has arrived.
///
/// Each article goes through the normal transition path; one that lost a
/// race (someone published or returned it meanwhile) is skipped with a
/// warning, never retried here.
pub async fn publish_due_articles(deps: &ServerDeps) -> Result<u64> {
    let due = Article::find_due_scheduled(&deps.db_pool).await?;
    if due.is_empty() {
        return Ok(0);
    }

    let mut published = 0u64;
    for article in due {
        match apply_transition(
            deps,
            article.id,
            ArticleStatus::Published,
            ActorRef::System,
            None,
            None,
        )
        .await
        {
            Ok((_, event)) => {
                published += 1;
                if let Err(e) = notify(deps, NotificationEvent::Transition(event)).await {
                    error!(article_id = %article.id, error = %e, "Publish notification dispatch failed");
                }
            }
            Err(e) => {
                warn!(article_id = %article.id, error = %e, "Skipped due article");
            }
        }
    }

    info!(published, "Sweep: published due scheduled articles");
    Ok(published)
}
