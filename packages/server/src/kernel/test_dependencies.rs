// TestDependencies - mock implementations for testing
//
// Provides mock channel services that can be injected into ServerDeps so
// dispatch behavior is testable without a database or transports.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::common::Role;
use crate::domains::auth::JwtService;
use crate::domains::notifications::models::notification::{NewNotification, Notification};
use crate::domains::users::models::user::User;
use crate::kernel::registry::ConnectionRegistry;
use crate::kernel::traits::{BaseEmailService, BaseNotificationStore, BaseUserDirectory};
use crate::kernel::ServerDeps;

/// Build a user row for tests
pub fn test_user(name: &str, role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@masthead.test", name.to_lowercase().replace(' ', ".")),
        role,
        is_active: true,
        created_at: Utc::now(),
    }
}

// =============================================================================
// Mock Email Service
// =============================================================================

pub struct MockEmailService {
    sent: Arc<Mutex<Vec<(String, String, String)>>>,
    failing: bool,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: false,
        }
    }

    /// Every send fails, to exercise channel isolation
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: true,
        }
    }

    /// Get all (to, subject, html) messages that were sent
    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Check if a message was sent to the given address
    pub fn was_sent_to(&self, to: &str) -> bool {
        self.sent.lock().unwrap().iter().any(|(t, _, _)| t == to)
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseEmailService for MockEmailService {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        if self.failing {
            anyhow::bail!("simulated email transport failure");
        }
        self.sent.lock().unwrap().push((
            to.to_string(),
            subject.to_string(),
            html_body.to_string(),
        ));
        Ok(())
    }
}

// =============================================================================
// Mock Notification Store
// =============================================================================

pub struct MockNotificationStore {
    created: Arc<Mutex<Vec<Notification>>>,
    failing: bool,
}

impl MockNotificationStore {
    pub fn new() -> Self {
        Self {
            created: Arc::new(Mutex::new(Vec::new())),
            failing: false,
        }
    }

    /// Every create fails, to exercise the durability-floor contract
    pub fn failing() -> Self {
        Self {
            created: Arc::new(Mutex::new(Vec::new())),
            failing: true,
        }
    }

    /// All records created so far
    pub fn created(&self) -> Vec<Notification> {
        self.created.lock().unwrap().clone()
    }

    /// Records created for one recipient
    pub fn created_for(&self, user_id: Uuid) -> Vec<Notification> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl Default for MockNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseNotificationStore for MockNotificationStore {
    async fn create(&self, new: NewNotification) -> Result<Notification> {
        if self.failing {
            anyhow::bail!("simulated notification store failure");
        }
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            title: new.title,
            message: new.message,
            kind: new.kind,
            is_read: false,
            data: new.data,
            created_at: Utc::now(),
        };
        self.created.lock().unwrap().push(notification.clone());
        Ok(notification)
    }
}

// =============================================================================
// Mock User Directory
// =============================================================================

pub struct MockUserDirectory {
    users: Arc<Mutex<Vec<User>>>,
}

impl MockUserDirectory {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Seed a user into the directory
    pub fn with_user(self, user: User) -> Self {
        self.users.lock().unwrap().push(user);
        self
    }
}

impl Default for MockUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseUserDirectory for MockUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_active_by_role(&self, role: Role) -> Result<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.role == role && u.is_active)
            .cloned()
            .collect())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

pub struct TestDependencies {
    pub email: Arc<MockEmailService>,
    pub store: Arc<MockNotificationStore>,
    pub users: Arc<MockUserDirectory>,
    pub registry: ConnectionRegistry,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            email: Arc::new(MockEmailService::new()),
            store: Arc::new(MockNotificationStore::new()),
            users: Arc::new(MockUserDirectory::new()),
            registry: ConnectionRegistry::new(),
        }
    }

    /// Set a mock email service
    pub fn mock_email(mut self, email: MockEmailService) -> Self {
        self.email = Arc::new(email);
        self
    }

    /// Set a mock notification store
    pub fn mock_store(mut self, store: MockNotificationStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    /// Set a mock user directory
    pub fn mock_users(mut self, users: MockUserDirectory) -> Self {
        self.users = Arc::new(users);
        self
    }

    /// Build ServerDeps over these mocks. The TestDependencies value keeps
    /// its handles so tests can assert on recorded calls afterwards.
    ///
    /// The pool is lazy and never connects: tests that go through the
    /// mocks exercise everything above SQL.
    pub fn to_deps(&self) -> ServerDeps {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/masthead_test")
            .expect("lazy test pool");
        ServerDeps::new(
            pool,
            self.users.clone(),
            self.store.clone(),
            self.email.clone(),
            self.registry.clone(),
            Arc::new(JwtService::new("test_secret", "masthead_test".to_string())),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
