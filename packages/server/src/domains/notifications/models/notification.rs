use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domains::notifications::events::NotificationKind;

/// Notification record - the in-app channel, and the only channel with a
/// durability contract.
///
/// Owned exclusively by its recipient; after creation the system only
/// ever flips `is_read`.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a notification record
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub data: serde_json::Value,
}

impl Notification {
    /// Insert a notification record
    pub async fn insert(new: &NewNotification, pool: &PgPool) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO notifications (user_id, title, message, kind, data)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.message)
        .bind(new.kind)
        .bind(&new.data)
        .fetch_one(pool)
        .await
    }

    /// List a recipient's notifications, newest first
    pub async fn list_for_user(
        user_id: Uuid,
        unread_only: bool,
        page: i64,
        per_page: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let offset = (page.max(1) - 1) * per_page;
        sqlx::query_as::<_, Self>(
            "SELECT * FROM notifications
             WHERE user_id = $1 AND (NOT $2 OR is_read = false)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Count a recipient's unread notifications
    pub async fn unread_count(user_id: Uuid, pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Mark one notification read, scoped to its recipient.
    ///
    /// Returns `None` when the notification does not exist or belongs to
    /// someone else; callers surface both as not-found.
    pub async fn mark_read(
        id: Uuid,
        user_id: Uuid,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE notifications SET is_read = true
             WHERE id = $1 AND user_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Mark all of a recipient's notifications read; returns rows updated
    pub async fn mark_all_read(user_id: Uuid, pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
