use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use roleguard_auth::Role;
use roleguard_core::UserId;

use super::{NewUser, StoreError, UserRecord, UserStore, UserSummary};

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    users: BTreeMap<UserId, UserRecord>,
}

/// In-memory user store.
///
/// Intended for tests/dev. Ids start at 1 like a database sequence.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    state: RwLock<State>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Database("lock poisoned".to_string())
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;

        if state.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        state.last_id += 1;
        let record = UserRecord {
            id: UserId::new(state.last_id),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
        };
        state.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<UserSummary>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.users.values().map(UserRecord::summary).collect())
    }

    async fn update_role(&self, id: UserId, role: &Role) -> Result<Option<UserSummary>, StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        Ok(state.users.get_mut(&id).map(|user| {
            user.role = role.clone();
            user.summary()
        }))
    }
}
