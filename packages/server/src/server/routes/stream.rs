//! SSE streaming endpoint.
//!
//! GET /api/stream?token=JWT
//!
//! Registers the authenticated user's live connection and forwards
//! notification payloads as SSE events.
//!
//! Auth strategy: JWT passed as `?token=` query param.
//! EventSource can't send custom headers, so the client appends the token
//! it already holds to the URL; the Authorization header still works as a
//! fallback for non-browser clients.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;

use crate::server::app::AxumAppState;

/// Heartbeat period for long-lived streams.
const HEARTBEAT_SECS: u64 = 15;

#[derive(Deserialize)]
pub struct StreamQuery {
    /// JWT token for authentication
    token: Option<String>,
}

/// SSE stream handler.
///
/// Sends a `connected` acknowledgment, then `notification` events as the
/// dispatcher pushes them, with periodic heartbeats in between. The
/// connection registry entry is torn down when the stream ends; a
/// reconnect replaces it (last-writer-wins).
pub async fn stream_handler(
    Extension(state): Extension<AxumAppState>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let token = query
        .token
        .or_else(|| extract_bearer_token(&headers))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = state
        .deps
        .jwt_service
        .verify_token(&token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // Register the live connection; the guard removes it when the client
    // goes away and the stream drops.
    let (guard, rx) = state.deps.registry.connect(claims.user_id);

    let connected =
        stream::once(async { Ok::<_, Infallible>(Event::default().event("connected").data("ok")) });

    let events = ReceiverStream::new(rx).filter_map(move |value| {
        let _ = &guard;
        async move {
            let event_name = value
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or("message")
                .to_string();
            Event::default()
                .event(event_name)
                .json_data(&value)
                .ok()
                .map(Ok)
        }
    });

    Ok(Sse::new(connected.chain(events)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(HEARTBEAT_SECS))
            .text("heartbeat"),
    ))
}

/// Extract Bearer token from Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get("authorization")?.to_str().ok()?;
    auth.strip_prefix("Bearer ").map(|t| t.to_string())
}
