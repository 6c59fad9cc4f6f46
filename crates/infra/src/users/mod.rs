//! User storage boundary.
//!
//! Handlers talk to `UserStore`; the in-memory implementation backs tests and
//! local development, the Postgres one backs deployments.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use roleguard_auth::Role;
use roleguard_core::UserId;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

/// A stored user including its password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl UserRecord {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

/// Public view of a user (no password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// User store operation error.
///
/// The message text is surfaced to API callers on 500 responses, so it
/// should describe the failing operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (username taken).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a user. Fails with [`StoreError::Conflict`] if the username is taken.
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// All users ordered by id.
    async fn list(&self) -> Result<Vec<UserSummary>, StoreError>;

    /// Returns `None` when no user has `id`.
    async fn update_role(&self, id: UserId, role: &Role) -> Result<Option<UserSummary>, StoreError>;
}
