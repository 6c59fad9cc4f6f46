use thiserror::Error;

use crate::{Identity, Permission, RolePolicy};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// No authenticated identity (or an identity without a role) reached
    /// the authorization check.
    #[error("no user role found")]
    NoRole,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize an (optional) authenticated identity for one permission.
///
/// - No IO
/// - No panics
/// - Never inspects tokens; the identity must already be authenticated
pub fn authorize(
    identity: Option<&Identity>,
    required: &Permission,
    policy: &RolePolicy,
) -> Result<(), AuthzError> {
    let identity = identity.ok_or(AuthzError::NoRole)?;

    if identity.role.as_str().is_empty() {
        return Err(AuthzError::NoRole);
    }

    if policy.grants(&identity.role, required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
