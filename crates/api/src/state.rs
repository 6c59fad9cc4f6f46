//! Shared application state handed to every handler and gate.

use std::sync::Arc;

use roleguard_auth::{
    CredentialStore, InMemoryRevocationRegistry, RevocationRegistry, RolePolicy, TokenError,
    TokenService,
};
use roleguard_infra::{InMemoryUserStore, UserStore};

/// Everything a request needs, cheap to clone.
///
/// The revocation registry and the user store are trait objects so the
/// process can pick in-memory or shared backends at startup.
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub revocations: Arc<dyn RevocationRegistry>,
    pub users: Arc<dyn UserStore>,
    pub policy: Arc<RolePolicy>,
}

impl AppState {
    pub fn new(
        tokens: TokenService,
        credentials: CredentialStore,
        users: Arc<dyn UserStore>,
        revocations: Arc<dyn RevocationRegistry>,
    ) -> Self {
        Self {
            tokens,
            credentials,
            revocations,
            users,
            policy: Arc::new(RolePolicy::standard()),
        }
    }

    /// Fully in-process state: in-memory users and revocation registry.
    pub fn in_memory(secret: &str, credentials: CredentialStore) -> Result<Self, TokenError> {
        Ok(Self::new(
            TokenService::new(secret)?,
            credentials,
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryRevocationRegistry::new()),
        ))
    }
}
