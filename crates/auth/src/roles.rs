use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC.
///
/// Roles are opaque strings at this layer. A role read from a token or from
/// the user store may be anything (including empty); mapping roles to
/// permissions is the job of [`crate::RolePolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    pub const MODERATOR: Role = Role(Cow::Borrowed("moderator"));
    pub const USER: Role = Role(Cow::Borrowed("user"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Roles an administrator may assign through the role-update route.
    pub fn assignable() -> [Role; 3] {
        [Role::ADMIN, Role::MODERATOR, Role::USER]
    }

    pub fn is_assignable(&self) -> bool {
        Self::assignable().iter().any(|r| r == self)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}
