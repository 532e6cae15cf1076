// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. The recipient
// resolver and dispatcher are domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseEmailService)

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::common::Role;
use crate::domains::notifications::models::notification::{NewNotification, Notification};
use crate::domains::users::models::user::User;

// =============================================================================
// Email Trait (Infrastructure - best-effort channel)
// =============================================================================

#[async_trait]
pub trait BaseEmailService: Send + Sync {
    /// Send one email. Failures are terminal: the dispatcher logs them and
    /// never retries.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}

// =============================================================================
// Notification Store Trait (Infrastructure - durable channel)
// =============================================================================

#[async_trait]
pub trait BaseNotificationStore: Send + Sync {
    /// Create an in-app notification record
    async fn create(&self, new: NewNotification) -> Result<Notification>;
}

// =============================================================================
// User Directory Trait (Infrastructure - recipient lookup)
// =============================================================================

#[async_trait]
pub trait BaseUserDirectory: Send + Sync {
    /// Fetch a user by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// All active users holding a role, for role-targeted fan-out
    async fn find_active_by_role(&self, role: Role) -> Result<Vec<User>>;
}
