//! Article workflow endpoint.
//!
//! POST /api/articles/:id/status
//!
//! Applies a status transition for the authenticated actor, then
//! dispatches notifications best-effort. A dispatch failure is logged and
//! never fails the response: the transition has already committed.

use axum::extract::{Extension, Path};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::domains::articles::actions::{apply_transition, ActorRef};
use crate::domains::articles::models::article::ArticleStatus;
use crate::domains::notifications::dispatcher::notify;
use crate::domains::notifications::events::NotificationEvent;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::middleware::AuthUser;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: ArticleStatus,
    pub feedback: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusResponse {
    pub id: Uuid,
    pub status: ArticleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

pub async fn update_status_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Path(article_id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let (article, event) = apply_transition(
        &state.deps,
        article_id,
        body.status,
        ActorRef::User {
            id: user.user_id,
            role: user.role,
        },
        body.feedback,
        body.scheduled_at,
    )
    .await?;

    if let Err(e) = notify(&state.deps, NotificationEvent::Transition(event)).await {
        error!(article_id = %article.id, error = %e, "Notification dispatch failed");
    }

    Ok(Json(UpdateStatusResponse {
        id: article.id,
        status: article.status,
        published_at: article.published_at,
        scheduled_at: article.scheduled_at,
    }))
}
