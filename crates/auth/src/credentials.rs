//! Password hashing and verification (bcrypt).

use thiserror::Error;

/// Work factor used for new password hashes.
pub const DEFAULT_COST: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("hashing error: {0}")]
    Hashing(String),

    #[error("comparison error: {0}")]
    Comparison(String),
}

/// Stateless bcrypt wrapper.
///
/// Both operations are CPU-bound; async callers should run them on a
/// blocking thread.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CredentialStore {
    cost: u32,
}

impl CredentialStore {
    /// Use a custom work factor. bcrypt accepts 4..=31; anything else fails
    /// at hash time with [`CredentialError::Hashing`].
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    /// Returns `Ok(false)` on mismatch; `Err` only when `hashed` is not a
    /// usable bcrypt hash.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> Result<bool, CredentialError> {
        bcrypt::verify(plaintext, hashed).map_err(|e| CredentialError::Comparison(e.to_string()))
    }
}
