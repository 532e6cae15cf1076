use std::fmt;

use super::Role;

/// Capabilities in the Masthead editorial platform
///
/// Closed set of permission tokens. The string form (`article:approve`)
/// is what appears in logs and error messages; behavior always dispatches
/// on the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Create a new article draft
    ArticleCreate,

    /// Edit own DRAFT / NEEDS_REVISION content
    ArticleEditOwn,

    /// Submit a draft (or revision) for review
    ArticleSubmit,

    /// See the review queue
    ArticleReview,

    /// Approve an article in review
    ArticleApprove,

    /// Send an article back for revision
    ArticleReject,

    /// Return an already-approved article to review
    ArticleReturn,

    /// Schedule an approved article for later publication
    ArticleSchedule,

    /// Publish an approved or scheduled article
    ArticlePublish,

    /// Archive a published article
    ArticleArchive,

    /// Restore an archived article back into review
    ArticleRestore,

    /// Approve, hide, or delete reader comments
    CommentModerate,

    /// Manage existing user accounts
    UserManage,

    /// Create new user accounts
    UserCreate,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::ArticleCreate => "article:create",
            Permission::ArticleEditOwn => "article:edit_own",
            Permission::ArticleSubmit => "article:submit",
            Permission::ArticleReview => "article:review",
            Permission::ArticleApprove => "article:approve",
            Permission::ArticleReject => "article:reject",
            Permission::ArticleReturn => "article:return",
            Permission::ArticleSchedule => "article:schedule",
            Permission::ArticlePublish => "article:publish",
            Permission::ArticleArchive => "article:archive",
            Permission::ArticleRestore => "article:restore",
            Permission::CommentModerate => "comment:moderate",
            Permission::UserManage => "user:manage",
            Permission::UserCreate => "user:create",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const STAFF_PERMISSIONS: &[Permission] = &[
    Permission::ArticleCreate,
    Permission::ArticleEditOwn,
    Permission::ArticleSubmit,
];

const SECTION_HEAD_PERMISSIONS: &[Permission] = &[
    Permission::ArticleCreate,
    Permission::ArticleEditOwn,
    Permission::ArticleSubmit,
    Permission::ArticleReview,
    Permission::ArticleApprove,
    Permission::ArticleReject,
    Permission::CommentModerate,
];

const EDITOR_IN_CHIEF_PERMISSIONS: &[Permission] = &[
    Permission::ArticleCreate,
    Permission::ArticleEditOwn,
    Permission::ArticleSubmit,
    Permission::ArticleReview,
    Permission::ArticleApprove,
    Permission::ArticleReject,
    Permission::ArticleReturn,
    Permission::ArticleSchedule,
    Permission::ArticlePublish,
    Permission::ArticleArchive,
    Permission::CommentModerate,
    Permission::UserManage,
    Permission::UserCreate,
];

const ADVISER_PERMISSIONS: &[Permission] = &[
    Permission::ArticleCreate,
    Permission::ArticleEditOwn,
    Permission::ArticleSubmit,
    Permission::ArticleReview,
    Permission::ArticleApprove,
    Permission::ArticleReject,
    Permission::ArticleReturn,
    Permission::ArticleSchedule,
    Permission::ArticlePublish,
    Permission::ArticleArchive,
    Permission::ArticleRestore,
    Permission::CommentModerate,
    Permission::UserManage,
    Permission::UserCreate,
];

/// The static capability matrix: role -> granted permissions.
///
/// SystemAdmin is handled in `has_permission` (holds everything) so the
/// matrix never drifts when a permission is added.
pub fn permissions_for(role: Role) -> &'static [Permission] {
    match role {
        Role::Staff => STAFF_PERMISSIONS,
        Role::SectionHead => SECTION_HEAD_PERMISSIONS,
        Role::EditorInChief => EDITOR_IN_CHIEF_PERMISSIONS,
        Role::Adviser => ADVISER_PERMISSIONS,
        Role::SystemAdmin => ADVISER_PERMISSIONS,
    }
}

/// Check whether a role holds a single permission.
pub fn has_permission(role: Role, permission: Permission) -> bool {
    if role == Role::SystemAdmin {
        return true;
    }
    permissions_for(role).contains(&permission)
}

/// Check whether a role holds at least one of the given permissions.
pub fn has_any_permission(role: Role, permissions: &[Permission]) -> bool {
    permissions.iter().any(|p| has_permission(role, *p))
}

/// Check whether a role holds every one of the given permissions.
pub fn has_all_permissions(role: Role, permissions: &[Permission]) -> bool {
    permissions.iter().all(|p| has_permission(role, *p))
}

/// Can `manager` administer accounts holding `target`?
///
/// SystemAdmin manages everyone. Adviser manages every role below
/// SystemAdmin (including other advisers). EditorInChief manages the
/// editorial tiers below it. SectionHead and Staff manage no one.
pub fn can_manage_role(manager: Role, target: Role) -> bool {
    match manager {
        Role::SystemAdmin => true,
        Role::Adviser => target.tier() < Role::SystemAdmin.tier(),
        Role::EditorInChief => target.tier() <= Role::SectionHead.tier(),
        Role::SectionHead | Role::Staff => false,
    }
}

/// Can `creator` create a new account holding `target`?
///
/// Same shape as `can_manage_role`: creating an account is managing it.
pub fn can_create_user_role(creator: Role, target: Role) -> bool {
    can_manage_role(creator, target)
}
