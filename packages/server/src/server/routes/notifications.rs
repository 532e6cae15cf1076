//! Notification endpoints, all scoped to the authenticated recipient.
//!
//! GET  /api/notifications?page=&per_page=&unread_only=
//! GET  /api/notifications/unread-count
//! POST /api/notifications/:id/read
//! POST /api/notifications/read-all

use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domains::notifications::models::notification::Notification;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub unread_only: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub notifications: Vec<Notification>,
    pub page: i64,
    pub per_page: i64,
}

pub async fn list_notifications_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let notifications = Notification::list_for_user(
        user.user_id,
        query.unread_only.unwrap_or(false),
        page,
        per_page,
        &state.db_pool,
    )
    .await?;

    Ok(Json(ListResponse {
        notifications,
        page,
        per_page,
    }))
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

pub async fn unread_count_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let count = Notification::unread_count(user.user_id, &state.db_pool).await?;
    Ok(Json(UnreadCountResponse { count }))
}

pub async fn mark_read_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
    // Recipient-scoped update: someone else's notification is
    // indistinguishable from a missing one.
    let notification = Notification::mark_read(notification_id, user.user_id, &state.db_pool)
        .await?
        .ok_or(ApiError::NotFound("notification"))?;
    Ok(Json(notification))
}

#[derive(Serialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

pub async fn mark_all_read_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let updated = Notification::mark_all_read(user.user_id, &state.db_pool).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
