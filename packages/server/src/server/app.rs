//! Application setup and server configuration.

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    health_handler, list_notifications_handler, mark_all_read_handler, mark_read_handler,
    stream_handler, unread_count_handler, update_status_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub db_pool: PgPool,
    pub deps: ServerDeps,
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps) -> Router {
    let app_state = AxumAppState {
        db_pool: deps.db_pool.clone(),
        deps,
    };

    // CORS configuration - the API serves browser clients on other origins
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Clone jwt_service for middleware closure
    let jwt_service_for_middleware = app_state.deps.jwt_service.clone();

    Router::new()
        // Workflow
        .route("/api/articles/:id/status", post(update_status_handler))
        // Notifications (recipient-scoped)
        .route("/api/notifications", get(list_notifications_handler))
        .route("/api/notifications/unread-count", get(unread_count_handler))
        .route("/api/notifications/:id/read", post(mark_read_handler))
        .route("/api/notifications/read-all", post(mark_all_read_handler))
        // Real-time stream
        .route("/api/stream", get(stream_handler))
        // Health check
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
