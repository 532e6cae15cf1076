//! API error mapping.
//!
//! Workflow and permission errors are recovered here, at the boundary of
//! the triggering request, and returned to the end user with the
//! disallowed-edge reason. Notification-channel failures never reach this
//! type; they are logged where they happen.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::domains::articles::error::WorkflowError;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    NotFound(&'static str),
    Workflow(WorkflowError),
    Internal(anyhow::Error),
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        ApiError::Workflow(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::Workflow(e) => match e {
                WorkflowError::InvalidTransition { .. } => (StatusCode::CONFLICT, e.to_string()),
                WorkflowError::Forbidden { .. } => (StatusCode::FORBIDDEN, e.to_string()),
                WorkflowError::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
                WorkflowError::InvalidSchedule => {
                    (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
                }
                WorkflowError::Database(_) | WorkflowError::Internal(_) => {
                    error!(error = %e, "Workflow infrastructure error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ApiError::Internal(e) => {
                error!(error = %e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
