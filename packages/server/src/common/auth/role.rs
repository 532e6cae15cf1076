use serde::{Deserialize, Serialize};
use std::fmt;

/// Editorial roles, ordered from base tier to top tier.
///
/// The tier ordering drives both the capability matrix and the relational
/// checks (`can_manage_role`, `can_create_user_role`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role")]
pub enum Role {
    #[sqlx(rename = "STAFF")]
    Staff,
    #[sqlx(rename = "SECTION_HEAD")]
    SectionHead,
    #[sqlx(rename = "EDITOR_IN_CHIEF")]
    EditorInChief,
    #[sqlx(rename = "ADVISER")]
    Adviser,
    #[sqlx(rename = "SYSTEM_ADMIN")]
    SystemAdmin,
}

impl Role {
    /// All roles, base tier first.
    pub const ALL: [Role; 5] = [
        Role::Staff,
        Role::SectionHead,
        Role::EditorInChief,
        Role::Adviser,
        Role::SystemAdmin,
    ];

    /// Numeric tier for hierarchy comparisons. Higher is more privileged.
    pub fn tier(self) -> u8 {
        match self {
            Role::Staff => 0,
            Role::SectionHead => 1,
            Role::EditorInChief => 2,
            Role::Adviser => 3,
            Role::SystemAdmin => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Staff => "STAFF",
            Role::SectionHead => "SECTION_HEAD",
            Role::EditorInChief => "EDITOR_IN_CHIEF",
            Role::Adviser => "ADVISER",
            Role::SystemAdmin => "SYSTEM_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
