//! Revoked-token registry (logout blacklist).

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RevocationError {
    #[error("revocation backend error: {0}")]
    Backend(String),
}

/// Registry entry that revokes every token of a login session.
///
/// Token strings are JWTs and never start with this prefix.
pub fn session_key(sid: &str) -> String {
    format!("session:{sid}")
}

/// Set of revoked token strings and session keys.
///
/// Every operation is idempotent: adding a present entry or removing an
/// absent one is not an error. Implementations must make `contains`
/// linearizable with respect to `add`/`remove`.
#[async_trait]
pub trait RevocationRegistry: Send + Sync {
    async fn add(&self, entry: &str) -> Result<(), RevocationError>;
    async fn remove(&self, entry: &str) -> Result<(), RevocationError>;
    async fn contains(&self, entry: &str) -> Result<bool, RevocationError>;
}

#[async_trait]
impl<S> RevocationRegistry for Arc<S>
where
    S: RevocationRegistry + ?Sized,
{
    async fn add(&self, entry: &str) -> Result<(), RevocationError> {
        (**self).add(entry).await
    }

    async fn remove(&self, entry: &str) -> Result<(), RevocationError> {
        (**self).remove(entry).await
    }

    async fn contains(&self, entry: &str) -> Result<bool, RevocationError> {
        (**self).contains(entry).await
    }
}

/// In-process registry. Entries live until removed or the process exits.
#[derive(Debug, Default)]
pub struct InMemoryRevocationRegistry {
    inner: RwLock<HashSet<String>>,
}

impl InMemoryRevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> RevocationError {
    RevocationError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl RevocationRegistry for InMemoryRevocationRegistry {
    async fn add(&self, entry: &str) -> Result<(), RevocationError> {
        let mut set = self.inner.write().map_err(|_| poisoned())?;
        set.insert(entry.to_string());
        Ok(())
    }

    async fn remove(&self, entry: &str) -> Result<(), RevocationError> {
        let mut set = self.inner.write().map_err(|_| poisoned())?;
        set.remove(entry);
        Ok(())
    }

    async fn contains(&self, entry: &str) -> Result<bool, RevocationError> {
        let set = self.inner.read().map_err(|_| poisoned())?;
        Ok(set.contains(entry))
    }
}
