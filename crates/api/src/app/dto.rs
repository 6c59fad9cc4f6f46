use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

use roleguard_auth::TokenPair;
use roleguard_core::{DomainError, UserId};

// -------------------------
// Request DTOs
// -------------------------

// Fields are optional so a missing field reaches the handler's own
// validation instead of failing deserialization.

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refreshtoken: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub user_id: Option<UserIdInput>,
    #[serde(default)]
    pub new_role: Option<String>,
}

/// Clients send the user id either as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserIdInput {
    Number(i64),
    Text(String),
}

impl UserIdInput {
    pub fn parse(&self) -> Result<UserId, DomainError> {
        match self {
            UserIdInput::Number(n) => Ok(UserId::new(*n)),
            UserIdInput::Text(s) => s.parse(),
        }
    }
}

// -------------------------
// Response helpers
// -------------------------

pub const ACCESS_TOKEN_HEADER: &str = "access_token";
pub const REFRESH_TOKEN_HEADER: &str = "refresh_token";

/// `Access_token` / `Refresh_token` response headers for a freshly issued pair.
pub fn token_headers(tokens: &TokenPair) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    for (name, value) in [
        (ACCESS_TOKEN_HEADER, &tokens.accesstoken),
        (REFRESH_TOKEN_HEADER, &tokens.refreshtoken),
    ] {
        let value = HeaderValue::from_str(value).map_err(|e| format!("invalid token header: {e}"))?;
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(headers)
}
