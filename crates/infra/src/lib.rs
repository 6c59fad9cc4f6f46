//! Infrastructure layer: user storage and shared revocation backends.

pub mod revocation;
pub mod users;

pub use users::{InMemoryUserStore, NewUser, PostgresUserStore, StoreError, UserRecord, UserStore, UserSummary};
