pub mod auth;

pub use auth::{can_create_user_role, can_manage_role, has_permission, AuthError, Permission, Role};
