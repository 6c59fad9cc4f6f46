//! Consistent error responses.
//!
//! Two body shapes exist on the wire:
//! - account routes (`/login`, `/createUser`, `/refresh`) answer
//!   `{"status": -1, "description": ...}`
//! - gates and protected routes answer `{"message": ...}`
//!
//! 500-class responses carry the underlying error text.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use roleguard_auth::{AuthzError, CredentialError, RevocationError, TokenError};
use roleguard_infra::StoreError;

/// Failures of the account routes (registration, login, refresh).
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidCredentials,

    #[error("User already exists")]
    UserExists,

    #[error("Token has been invalidated")]
    TokenRevoked,

    #[error("Invalid Token")]
    InvalidToken,

    #[error("Database error\nError message: {0}")]
    Store(StoreError),

    #[error("Hashing error\nError message: {0}")]
    Hashing(String),

    #[error("Revocation error\nError message: {0}")]
    Revocation(RevocationError),

    /// Detail is logged, not returned.
    #[error("Internal server error")]
    Internal(String),
}

impl AccountError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccountError::Validation(_) => StatusCode::BAD_REQUEST,
            AccountError::UserNotFound => StatusCode::NOT_FOUND,
            AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AccountError::UserExists => StatusCode::CONFLICT,
            AccountError::TokenRevoked | AccountError::InvalidToken => StatusCode::FORBIDDEN,
            AccountError::Store(_)
            | AccountError::Hashing(_)
            | AccountError::Revocation(_)
            | AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            let detail = match &self {
                AccountError::Internal(detail) => detail.clone(),
                other => other.to_string(),
            };
            tracing::error!(status = status.as_u16(), error = %detail, "account request failed");
        }

        (
            status,
            Json(json!({
                "status": -1,
                "description": self.to_string(),
            })),
        )
            .into_response()
    }
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => AccountError::UserExists,
            other => AccountError::Store(other),
        }
    }
}

impl From<CredentialError> for AccountError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Hashing(msg) => AccountError::Hashing(msg),
            CredentialError::Comparison(msg) => AccountError::Internal(msg),
        }
    }
}

impl From<TokenError> for AccountError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AccountError::InvalidToken,
            other => AccountError::Internal(other.to_string()),
        }
    }
}

impl From<RevocationError> for AccountError {
    fn from(err: RevocationError) -> Self {
        AccountError::Revocation(err)
    }
}

impl From<JsonRejection> for AccountError {
    fn from(rejection: JsonRejection) -> Self {
        AccountError::Validation(rejection.body_text())
    }
}

/// Failures of the authentication/authorization gates and protected routes.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Access Denied")]
    Unauthenticated,

    #[error("Token has been invalidated")]
    TokenRevoked,

    #[error("Invalid Token")]
    InvalidToken,

    #[error("No user role found, please log in")]
    NoRole,

    #[error("Access Forbidden: You do not have the required permissions")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Store(StoreError),

    #[error("Internal server error")]
    Revocation(RevocationError),
}

impl AccessError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::Unauthenticated | AccessError::NoRole => StatusCode::UNAUTHORIZED,
            AccessError::TokenRevoked | AccessError::InvalidToken | AccessError::Forbidden => {
                StatusCode::FORBIDDEN
            }
            AccessError::Validation(_) => StatusCode::BAD_REQUEST,
            AccessError::NotFound(_) => StatusCode::NOT_FOUND,
            AccessError::Store(_) | AccessError::Revocation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AccessError::Store(err) => {
                tracing::error!(error = %err, "store failure on protected route");
                json!({ "message": self.to_string(), "error": err.to_string() })
            }
            AccessError::Revocation(err) => {
                tracing::error!(error = %err, "revocation registry failure");
                json!({ "message": self.to_string(), "error": err.to_string() })
            }
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthzError> for AccessError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NoRole => AccessError::NoRole,
            AuthzError::Forbidden(_) => AccessError::Forbidden,
        }
    }
}

impl From<StoreError> for AccessError {
    fn from(err: StoreError) -> Self {
        AccessError::Store(err)
    }
}

impl From<RevocationError> for AccessError {
    fn from(err: RevocationError) -> Self {
        AccessError::Revocation(err)
    }
}

impl From<JsonRejection> for AccessError {
    fn from(rejection: JsonRejection) -> Self {
        AccessError::Validation(rejection.body_text())
    }
}
