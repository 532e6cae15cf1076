/// Authorization module for the Masthead editorial platform
///
/// Every access-control decision in the system routes through the
/// capability matrix in this module: workflow edge gating, comment
/// moderation, and user management all ask the same questions:
///
/// ```ignore
/// use crate::common::auth::{has_permission, Permission, Role};
///
/// if !has_permission(actor.role, Permission::ArticleApprove) {
///     return Err(AuthError::PermissionDenied("article:approve".into()));
/// }
/// ```
///
/// Keeping the matrix in one place means no route ever re-implements a
/// role list per call site.
mod capability;
mod errors;
mod role;

pub use capability::{
    can_create_user_role, can_manage_role, has_all_permissions, has_any_permission,
    has_permission, permissions_for, Permission,
};
pub use errors::AuthError;
pub use role::Role;
