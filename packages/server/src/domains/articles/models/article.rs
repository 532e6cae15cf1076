use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

use crate::domains::articles::machines::AppliedTransition;

/// Article pipeline status.
///
/// Moves only along the edges the workflow machine defines; see
/// `domains::articles::machines`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "article_status")]
pub enum ArticleStatus {
    #[sqlx(rename = "DRAFT")]
    Draft,
    #[sqlx(rename = "IN_REVIEW")]
    InReview,
    #[sqlx(rename = "NEEDS_REVISION")]
    NeedsRevision,
    #[sqlx(rename = "APPROVED")]
    Approved,
    #[sqlx(rename = "SCHEDULED")]
    Scheduled,
    #[sqlx(rename = "PUBLISHED")]
    Published,
    #[sqlx(rename = "ARCHIVED")]
    Archived,
}

impl ArticleStatus {
    /// All statuses, in pipeline order.
    pub const ALL: [ArticleStatus; 7] = [
        ArticleStatus::Draft,
        ArticleStatus::InReview,
        ArticleStatus::NeedsRevision,
        ArticleStatus::Approved,
        ArticleStatus::Scheduled,
        ArticleStatus::Published,
        ArticleStatus::Archived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Draft => "DRAFT",
            ArticleStatus::InReview => "IN_REVIEW",
            ArticleStatus::NeedsRevision => "NEEDS_REVISION",
            ArticleStatus::Approved => "APPROVED",
            ArticleStatus::Scheduled => "SCHEDULED",
            ArticleStatus::Published => "PUBLISHED",
            ArticleStatus::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Article model - SQL persistence layer
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub status: ArticleStatus,
    pub author_id: Uuid,
    pub published_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Find article by ID
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a validated transition with an optimistic status guard.
    ///
    /// The `WHERE status = $2` clause is the concurrency contract: of two
    /// racing transitions, the loser matches zero rows and gets `None`
    /// back. `published_at` is COALESCEd so it is only ever written once.
    pub async fn apply_status(
        id: Uuid,
        expected: ArticleStatus,
        applied: &AppliedTransition,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE articles
             SET status = $3,
                 published_at = COALESCE(published_at, $4),
                 scheduled_at = COALESCE($5, scheduled_at),
                 updated_at = now()
             WHERE id = $1 AND status = $2
             RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(applied.to)
        .bind(applied.published_at)
        .bind(applied.scheduled_at)
        .fetch_optional(pool)
        .await
    }

    /// Find scheduled articles whose publish time has arrived
    pub async fn find_due_scheduled(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM articles
             WHERE status = 'SCHEDULED' AND scheduled_at <= now()
             ORDER BY scheduled_at",
        )
        .fetch_all(pool)
        .await
    }

    /// Insert new article
    pub async fn insert(&self, pool: &PgPool) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO articles (id, title, status, author_id)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(self.id)
        .bind(&self.title)
        .bind(self.status)
        .bind(self.author_id)
        .fetch_one(pool)
        .await
    }
}
