use roleguard_auth::{Identity, Role};

/// Authenticated identity attached to a request by the authentication gate.
///
/// Present in request extensions only after the token was checked against
/// the revocation registry and verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    identity: Identity,
}

impl IdentityContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn username(&self) -> &str {
        &self.identity.username
    }

    pub fn role(&self) -> &Role {
        &self.identity.role
    }
}
