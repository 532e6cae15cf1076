use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::Role;

/// User model - SQL persistence layer
///
/// Role determines both workflow permissions and notification targeting
/// ("all SECTION_HEAD users"). Inactive users keep their records but are
/// excluded from role-targeted fan-out.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Find user by ID
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find all active users holding a role, for notification targeting
    pub async fn find_active_by_role(role: Role, pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM users WHERE role = $1 AND is_active = true ORDER BY created_at",
        )
        .bind(role)
        .fetch_all(pool)
        .await
    }

    /// Insert new user
    pub async fn insert(&self, pool: &PgPool) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO users (id, name, email, role, is_active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.email)
        .bind(self.role)
        .bind(self.is_active)
        .fetch_one(pool)
        .await
    }
}
