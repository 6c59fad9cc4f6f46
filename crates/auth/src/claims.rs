use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Identity, Role};

/// Discriminates the two tokens minted per session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, presented on every protected request.
    Access,
    /// Longer-lived, exchanged for a fresh token pair.
    Refresh,
}

/// JWT claims model.
///
/// Timestamps are seconds since the Unix epoch (`iat`/`exp` as registered
/// JWT claims) so any JWT library can validate expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub role: Role,

    /// Token kind (`access` or `refresh`).
    pub typ: TokenKind,

    /// Unique token id, so two tokens minted in the same second differ.
    pub jti: String,

    /// Login session id, shared by the access and refresh token of one
    /// login and kept across refreshes.
    pub sid: String,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity::new(self.username.clone(), self.role.clone())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claim time window.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::TokenService`].
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
