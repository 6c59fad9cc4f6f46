use serde::{Deserialize, Serialize};

use crate::Role;

/// The identity claim carried inside every token.
///
/// Only `username` and `role` cross the token boundary; the store's numeric
/// id and password hash never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}
