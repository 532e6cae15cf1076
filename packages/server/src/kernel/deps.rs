//! Server dependencies for actions and dispatch (using traits for testability)
//!
//! This module provides the central dependency container used by the
//! transition action, the notification dispatcher, and the HTTP layer.
//! All external services use trait abstractions to enable testing.

use anyhow::Result;
use async_trait::async_trait;
use resend::{ResendOptions, ResendService};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::Role;
use crate::domains::auth::JwtService;
use crate::domains::notifications::models::notification::{NewNotification, Notification};
use crate::domains::users::models::user::User;
use crate::kernel::registry::ConnectionRegistry;
use crate::kernel::traits::{BaseEmailService, BaseNotificationStore, BaseUserDirectory};

// =============================================================================
// ResendService Adapter (implements BaseEmailService trait)
// =============================================================================

/// Wrapper around ResendService that implements the BaseEmailService trait.
///
/// Unconfigured environments (no API key) drop messages with a debug log;
/// email is a best-effort channel either way.
pub struct ResendAdapter {
    service: Option<ResendService>,
    from: String,
}

impl ResendAdapter {
    pub fn new(api_key: Option<String>, from: String) -> Self {
        let service = api_key.map(|api_key| ResendService::new(ResendOptions { api_key }));
        Self { service, from }
    }
}

#[async_trait]
impl BaseEmailService for ResendAdapter {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        match &self.service {
            Some(service) => service
                .send_email(&self.from, to, subject, html_body)
                .await
                .map(|_| ())
                .map_err(|e| anyhow::anyhow!("{}", e)),
            None => {
                tracing::debug!(to, "Email transport not configured; message dropped");
                Ok(())
            }
        }
    }
}

// =============================================================================
// Postgres adapters (implement store/directory traits over the models)
// =============================================================================

pub struct PgNotificationStore(pub PgPool);

#[async_trait]
impl BaseNotificationStore for PgNotificationStore {
    async fn create(&self, new: NewNotification) -> Result<Notification> {
        Notification::insert(&new, &self.0).await.map_err(Into::into)
    }
}

pub struct PgUserDirectory(pub PgPool);

#[async_trait]
impl BaseUserDirectory for PgUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        User::find_by_id(id, &self.0).await.map_err(Into::into)
    }

    async fn find_active_by_role(&self, role: Role) -> Result<Vec<User>> {
        User::find_active_by_role(role, &self.0)
            .await
            .map_err(Into::into)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to actions and dispatch
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub users: Arc<dyn BaseUserDirectory>,
    pub notifications: Arc<dyn BaseNotificationStore>,
    pub email: Arc<dyn BaseEmailService>,
    /// In-process registry of live SSE connections
    pub registry: ConnectionRegistry,
    /// JWT service for token verification
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        users: Arc<dyn BaseUserDirectory>,
        notifications: Arc<dyn BaseNotificationStore>,
        email: Arc<dyn BaseEmailService>,
        registry: ConnectionRegistry,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            db_pool,
            users,
            notifications,
            email,
            registry,
            jwt_service,
        }
    }

    /// Production wiring: Postgres-backed store and directory over `pool`.
    pub fn postgres(
        pool: PgPool,
        email: Arc<dyn BaseEmailService>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self::new(
            pool.clone(),
            Arc::new(PgUserDirectory(pool.clone())),
            Arc::new(PgNotificationStore(pool)),
            email,
            ConnectionRegistry::new(),
            jwt_service,
        )
    }
}
