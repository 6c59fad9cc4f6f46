//! Role → permission table.

use std::collections::{HashMap, HashSet};

use crate::{Permission, Role};

/// Immutable mapping from role name to the permissions it holds.
///
/// Built once at startup and shared by reference; there is no way to mutate
/// a policy after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePolicy {
    roles: HashMap<Role, HashSet<Permission>>,
}

impl RolePolicy {
    /// The built-in table: `admin` edits the dashboard and can write/read,
    /// `moderator` can write/read, `user` can read.
    pub fn standard() -> Self {
        Self::from_pairs([
            (
                Role::ADMIN,
                vec![Permission::DASHBOARD_EDIT, Permission::WRITE, Permission::READ],
            ),
            (Role::MODERATOR, vec![Permission::WRITE, Permission::READ]),
            (Role::USER, vec![Permission::READ]),
        ])
    }

    pub fn from_pairs<I, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Role, P)>,
        P: IntoIterator<Item = Permission>,
    {
        let roles = pairs
            .into_iter()
            .map(|(role, perms)| (role, perms.into_iter().collect()))
            .collect();
        Self { roles }
    }

    /// Permissions held by `role`, or `None` if the role is unknown.
    pub fn permissions_for(&self, role: &Role) -> Option<&HashSet<Permission>> {
        self.roles.get(role)
    }

    pub fn grants(&self, role: &Role, permission: &Permission) -> bool {
        self.permissions_for(role)
            .is_some_and(|perms| perms.contains(permission))
    }
}
